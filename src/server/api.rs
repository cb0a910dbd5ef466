use crate::constants::{PRIMARY_CURRENCY, SECONDARY_CURRENCY};
use crate::error::PriceError;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

#[derive(Debug, Deserialize)]
pub struct PriceBody {
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct PriceChangeBody {
    pub currency: String,
    pub days_ago: u32,
}

#[derive(Debug, Serialize)]
pub struct PriceChangeResponse {
    pub price_change: f64,
}

#[derive(Debug, Deserialize)]
pub struct CoinDataBody {
    pub coins: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub uptime_secs: u64,
    pub cached_prices: usize,
    pub cached_historic_days: usize,
    pub id_map_loaded: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    msg: String,
}

impl IntoResponse for PriceError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            PriceError::UnknownSymbol(symbol) => (
                StatusCode::NOT_FOUND,
                format!("no upstream id found for symbol {}", symbol),
            ),
            PriceError::NoHistoricPrice(id) => (
                StatusCode::NOT_FOUND,
                format!("no historic price found for {}", id),
            ),
            PriceError::BadResponse { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            // Full detail stays in the server log only.
            PriceError::Fetch(_)
            | PriceError::Decode(_)
            | PriceError::NotFound(_)
            | PriceError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request failed");
        }

        (status, Json(ErrorBody { msg })).into_response()
    }
}

/// POST /coin/{symbol}/price - current price for a ticker symbol
pub async fn get_price_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(body): Json<PriceBody>,
) -> Result<Json<PriceResponse>, PriceError> {
    debug!(%symbol, currency = %body.currency, "asked for price");

    let id = state.id_map.resolve(&symbol).await?;
    let price = state.prices.get_price(&id, &body.currency).await?;

    Ok(Json(PriceResponse { price }))
}

/// POST /coin/{symbol}/price-change - fractional change over `days_ago`
pub async fn get_price_change_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(body): Json<PriceChangeBody>,
) -> Result<Json<PriceChangeResponse>, PriceError> {
    debug!(
        %symbol,
        currency = %body.currency,
        days_ago = body.days_ago,
        "asked for price change"
    );

    let id = state.id_map.resolve(&symbol).await?;
    let price_change = state
        .changes
        .get_price_change(&id, &body.currency, body.days_ago)
        .await?;

    Ok(Json(PriceChangeResponse { price_change }))
}

/// POST /coin-data - tabular price + change overview for several symbols.
/// First row is the header; one row per coin follows.
pub async fn get_coin_data_handler(
    State(state): State<AppState>,
    Json(body): Json<CoinDataBody>,
) -> Result<Json<Vec<Value>>, PriceError> {
    debug!(coins = body.coins.len(), "asked for coin data table");

    let mut ids = Vec::with_capacity(body.coins.len());
    for coin in &body.coins {
        ids.push(state.id_map.resolve(coin).await?);
    }

    let prices = state.prices.get_prices(&ids, PRIMARY_CURRENCY).await?;

    let mut rows = vec![json!([
        "name",
        "price",
        "1d change",
        "7d change",
        "30d change",
        "180d change",
        "7d btc change"
    ])];

    for (coin, id) in body.coins.iter().zip(&ids) {
        let price = prices
            .get(id)
            .copied()
            .ok_or_else(|| PriceError::NotFound(id.clone()))?;

        let change_1d = state.changes.get_price_change(id, PRIMARY_CURRENCY, 1).await?;
        let change_7d = state.changes.get_price_change(id, PRIMARY_CURRENCY, 7).await?;
        let change_30d = state.changes.get_price_change(id, PRIMARY_CURRENCY, 30).await?;
        let change_180d = state
            .changes
            .get_price_change(id, PRIMARY_CURRENCY, 180)
            .await?;
        let change_7d_btc = state
            .changes
            .get_price_change(id, SECONDARY_CURRENCY, 7)
            .await?;

        rows.push(json!([
            coin.to_uppercase(),
            price,
            change_1d,
            change_7d,
            change_30d,
            change_180d,
            change_7d_btc
        ]));
    }

    Ok(Json(rows))
}

/// GET /health - uptime and cache population
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        cached_prices: state.price_cache.len(),
        cached_historic_days: state.historic_cache.len(),
        id_map_loaded: state.id_map.is_loaded(),
    })
}

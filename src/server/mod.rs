pub mod api;

use crate::error::Result;
use crate::services::price::{new_historic_cache, new_price_cache};
use crate::services::{
    CoinGeckoClient, FetchQueue, IdMapService, PriceChangeService, PriceService,
    SharedHistoricCache, SharedPriceCache,
};
use crate::utils::is_dev_mode;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Application state shared across all handlers.
///
/// Every cache is a process-wide singleton; request handlers only read
/// through the services, which own the designated write paths.
#[derive(Clone)]
pub struct AppState {
    pub id_map: Arc<IdMapService>,
    pub prices: Arc<PriceService>,
    pub changes: Arc<PriceChangeService>,
    pub price_cache: SharedPriceCache,
    pub historic_cache: SharedHistoricCache,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = CoinGeckoClient::new(base_url)?;
        let queue = Arc::new(FetchQueue::new());
        let price_cache = new_price_cache();
        let historic_cache = new_historic_cache();

        Ok(Self {
            id_map: Arc::new(IdMapService::new(client.clone())),
            prices: Arc::new(PriceService::new(
                client.clone(),
                queue.clone(),
                price_cache.clone(),
                historic_cache.clone(),
            )),
            changes: Arc::new(PriceChangeService::new(
                client,
                queue,
                historic_cache.clone(),
            )),
            price_cache,
            historic_cache,
            started_at: Instant::now(),
        })
    }
}

/// Build the router; separate from `serve` so tests can drive it directly
pub fn make_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/coin/{symbol}/price", post(api::get_price_handler))
        .route(
            "/coin/{symbol}/price-change",
            post(api::get_price_change_handler),
        )
        .route("/coin-data", post(api::get_coin_data_handler))
        .route("/health", get(api::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if is_dev_mode() {
        app = app.layer(middleware::from_fn(log_response_time));
    }

    app
}

async fn log_response_time(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();
    let response = next.run(req).await;
    debug!(
        "{} {} - {}ms",
        method,
        uri,
        start.elapsed().as_millis()
    );
    response
}

/// Start the axum server
pub async fn serve(state: AppState, port: u16) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting coinprices server");
    tracing::info!("Registering routes:");
    tracing::info!("  POST /coin/{{symbol}}/price");
    tracing::info!("  POST /coin/{{symbol}}/price-change");
    tracing::info!("  POST /coin-data");
    tracing::info!("  GET /health");

    let app = make_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coingecko::testing::{fixture_price, spawn_upstream};
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;

    async fn spawn_app(state: AppState) -> String {
        let app = make_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn serves_price_end_to_end_with_cold_caches() {
        let (upstream, calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state).await;
        let http = reqwest::Client::new();

        // Cold caches: one listing fetch plus one price fetch.
        let body: Value = http
            .post(format!("{}/coin/eth/price", base))
            .json(&json!({ "currency": "usd" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let price = body["price"].as_f64().unwrap();
        assert_eq!(price, fixture_price("ethereum", "usd"));
        assert_eq!(calls.list.load(Ordering::SeqCst), 1);
        assert_eq!(calls.price.load(Ordering::SeqCst), 1);

        // Within the TTL the second request touches upstream not at all.
        let body: Value = http
            .post(format!("{}/coin/eth/price", base))
            .json(&json!({ "currency": "usd" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["price"].as_f64().unwrap(), price);
        assert_eq!(calls.list.load(Ordering::SeqCst), 1);
        assert_eq!(calls.price.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn serves_price_change() {
        let (upstream, _calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state).await;

        let response = reqwest::Client::new()
            .post(format!("{}/coin/btc/price-change", base))
            .json(&json!({ "currency": "usd", "days_ago": 4 }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        let expected = 1.0 / 1.04 - 1.0;
        assert!((body["price_change"].as_f64().unwrap() - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn unknown_symbol_is_404_naming_the_symbol() {
        let (upstream, _calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state).await;

        let response = reqwest::Client::new()
            .post(format!("{}/coin/nope/price", base))
            .json(&json!({ "currency": "usd" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        let body: Value = response.json().await.unwrap();
        assert!(body["msg"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn upstream_429_passes_through_when_no_fallback() {
        let (upstream, calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state).await;
        calls.price_status.store(429, Ordering::SeqCst);

        let response = reqwest::Client::new()
            .post(format!("{}/coin/btc/price", base))
            .json(&json!({ "currency": "usd" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 429);
    }

    #[tokio::test]
    async fn coin_data_returns_header_and_rows() {
        let (upstream, _calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state).await;

        let body: Value = reqwest::Client::new()
            .post(format!("{}/coin-data", base))
            .json(&json!({ "coins": ["btc", "eth"] }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "name");
        assert_eq!(rows[1][0], "BTC");
        assert_eq!(rows[1][1].as_f64().unwrap(), fixture_price("bitcoin", "usd"));
        assert_eq!(rows[2][0], "ETH");
    }

    #[tokio::test]
    async fn health_reports_cache_sizes() {
        let (upstream, _calls) = spawn_upstream().await;
        let state = AppState::new(&upstream).unwrap();
        let base = spawn_app(state.clone()).await;
        let http = reqwest::Client::new();

        http.post(format!("{}/coin/btc/price", base))
            .json(&json!({ "currency": "usd" }))
            .send()
            .await
            .unwrap();

        let body: Value = http
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["cached_prices"].as_u64().unwrap(), 1);
        assert!(body["id_map_loaded"].as_bool().unwrap());
    }
}

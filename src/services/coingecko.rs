use crate::constants::HTTP_TIMEOUT_SECS;
use crate::error::{PriceError, Result};
use crate::models::{CoinListing, MarketChart, SimplePrices};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Thin client for the upstream price provider (CoinGecko-shaped API).
///
/// Carries no retry logic; every call maps to exactly one HTTP request and
/// failures are surfaced as distinct error kinds for the caller to handle.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PriceError::Config(format!(
                "invalid upstream base url: must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| PriceError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Fetch the complete identifier listing
    pub async fn fetch_coin_list(&self) -> Result<Vec<CoinListing>> {
        let url = format!("{}/coins/list", self.base_url);
        debug!(%url, "fetching upstream coin listing");
        self.get_json(&url).await
    }

    /// Fetch current prices for several identifiers in one call
    pub async fn fetch_simple_prices(&self, ids: &[String], currency: &str) -> Result<SimplePrices> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids.join(","),
            currency
        );
        debug!(%url, "fetching upstream prices");
        self.get_json(&url).await
    }

    /// Fetch a daily historical series spanning `days` days
    pub async fn fetch_market_chart(
        &self,
        id: &str,
        currency: &str,
        days: u32,
    ) -> Result<MarketChart> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            self.base_url, id, currency, days
        );
        debug!(%url, "fetching upstream historical series");
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PriceError::Fetch(format!("request to upstream failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = if status.as_u16() == 429 {
                "hit upstream rate limit".to_string()
            } else {
                format!("upstream bad response {}", status)
            };
            return Err(PriceError::BadResponse {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceError::Fetch(format!("failed to read upstream body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| PriceError::Decode(format!("failed to decode upstream body: {}", e)))
    }
}

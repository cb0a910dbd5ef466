use serde::Deserialize;
use std::collections::HashMap;

/// One entry of the upstream identifier listing (`GET /coins/list`)
#[derive(Debug, Clone, Deserialize)]
pub struct CoinListing {
    pub id: String,
    pub symbol: String,
    #[allow(dead_code)]
    pub name: String,
}

/// Simple price response: identifier -> currency -> price
pub type SimplePrices = HashMap<String, HashMap<String, f64>>;

/// Historical series response (`GET /coins/{id}/market_chart`).
///
/// `prices` is ordered oldest-first; timestamps are unix milliseconds at
/// the day boundary when `interval=daily` is requested.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<(i64, f64)>,
    #[serde(default)]
    #[allow(dead_code)]
    pub market_caps: Vec<(i64, f64)>,
    #[serde(default)]
    #[allow(dead_code)]
    pub total_volumes: Vec<(i64, f64)>,
}

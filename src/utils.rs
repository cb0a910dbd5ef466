use crate::constants::{COINGECKO_API_URL, WARMUP_DELAY_MS};
use std::time::Duration;

/// Get server port from environment variable or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

/// Get upstream API base URL from environment variable or use default
pub fn get_api_base_url() -> String {
    std::env::var("COINGECKO_API_URL").unwrap_or_else(|_| COINGECKO_API_URL.to_string())
}

/// Whether we run in development mode (skips cache warm-up)
pub fn is_dev_mode() -> bool {
    std::env::var("ENV").map(|v| v == "dev").unwrap_or(false)
}

/// Pause between warm-up symbols, overridable for slow upstreams
pub fn get_warmup_delay() -> Duration {
    let millis = std::env::var("WARMUP_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(WARMUP_DELAY_MS);
    Duration::from_millis(millis)
}

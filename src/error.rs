use thiserror::Error as ThisError;

/// Errors surfaced by the id resolution, price and price-change paths.
///
/// `BadResponse` keeps the upstream status so the transport layer can pass
/// it through unchanged (a 429 from the provider stays a 429 for clients).
#[derive(ThisError, Debug, Clone)]
pub enum PriceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to reach upstream: {0}")]
    Fetch(String),

    #[error("Upstream bad response {status}: {message}")]
    BadResponse { status: u16, message: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("No upstream id found for symbol {0}")]
    UnknownSymbol(String),

    #[error("No price in upstream response for {0}")]
    NotFound(String),

    #[error("No historic price for {0}")]
    NoHistoricPrice(String),
}

pub type Result<T> = std::result::Result<T, PriceError>;

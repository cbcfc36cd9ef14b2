use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, timeout, or a non-success HTTP status.
    #[error("Network response was not ok: {0}")]
    Network(String),

    /// The page body was missing, not JSON, or had no `orders` array.
    #[error("Invalid API response structure: {0}")]
    MalformedResponse(String),

    /// A single order's product list was absent or invalid. Recovered locally.
    #[error("Invalid products data in order: {0}")]
    MalformedOrder(String),

    #[error("Stopped after {0} page(s) without reaching the previous month")]
    PageLimitExceeded(u32),

    #[error("Aggregation cancelled before page {0} was requested")]
    Cancelled(u32),

    #[error("Aggregation superseded by a newer run")]
    Superseded,

    #[error("Invalid month: {0} (expected 0-11)")]
    InvalidMonth(u32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

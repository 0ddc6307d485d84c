//! Error types for dividend-health

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for dividend-health
///
/// Missing data and undefined metrics are not errors: they travel through the
/// pipeline as `Option`s. These variants cover provider calls, configuration
/// and request validation.
#[derive(Error, Debug)]
pub enum DividendError {
    #[error("Provider failure for {ticker}: {reason}")]
    ProviderFailure { ticker: String, reason: String },

    #[error("Malformed data for {ticker}: {reason}")]
    MalformedData { ticker: String, reason: String },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl DividendError {
    /// Shorthand for a provider failure on `ticker`
    pub fn provider(ticker: &str, reason: impl Into<String>) -> Self {
        Self::ProviderFailure {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for malformed provider data on `ticker`
    pub fn malformed(ticker: &str, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for dividend-health operations
pub type Result<T> = std::result::Result<T, DividendError>;

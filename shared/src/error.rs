//! Error types for the bot framework Lambda functions.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bot framework Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (malformed event payloads, missing slots)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Locale tag outside the supported set
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Intent the dispatcher has no handler for
    #[error("Intent with name {0} not supported")]
    UnsupportedIntent(String),

    /// Persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Upstream weather API failure
    #[error("Forecast provider error: {0}")]
    Forecast(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A bounded wait ran out before the watched resource settled
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error came from bad caller input rather than this code
    /// or an upstream service.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::UnsupportedLocale(_) | Error::UnsupportedIntent(_)
        )
    }
}

//! Error types for the data access layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Data Error Enum ==
/// Unified error type for fetch sources and record patching.
///
/// None of these escape the controller: they are logged and turned into the
/// `error` field of the published state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Transport or backend failure while fetching
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Backend answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// Payload was not a sequence of records
    #[error("Invalid data format: {0}")]
    Format(String),

    /// Partial update could not be applied to a record
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DataError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if err.is_decode() => DataError::Format(err.to_string()),
            None => DataError::Fetch(err.to_string()),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the data access layer.
pub type Result<T> = std::result::Result<T, DataError>;

//! Error types for the subscription API client.

use thiserror::Error;

/// Result type for subscription API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Subscription API client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not complete (connect failure, timeout, transport)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered, but the envelope reported a failure code
    #[error("API error {code}: {message}")]
    Application { code: i64, message: String },

    /// The response body could not be parsed
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the exchange reached the server and got an answer back.
    ///
    /// `Status` and `Application` are server-reported failures; `Network`
    /// and `Decode` never produced a usable answer.
    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::Application { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

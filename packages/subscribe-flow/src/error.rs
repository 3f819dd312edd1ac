//! Workflow error taxonomy.

use subscribe_client::ApiError;
use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// How a round trip failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete
    Network,
    /// The request completed and the server reported a failure
    Application,
}

/// Workflow errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Search was triggered with a blank name
    #[error("Enter a creator name to search")]
    EmptyQuery,

    /// The requested creator is not part of the current result set
    #[error("Creator {0} is not in the current search results")]
    UnknownEntity(i64),

    /// The request did not complete
    #[error("Network failure: {0}")]
    Network(String),

    /// The request completed with a server-reported failure
    #[error("{message}")]
    Application { code: i64, message: String },
}

impl FlowError {
    /// Server-reported failure. An empty message is replaced with one naming the code.
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        FlowError::Application {
            message: if message.is_empty() {
                format!("Request failed (code {code})")
            } else {
                message
            },
            code,
        }
    }

    /// Failure class for round-trip errors; `None` for local validation errors.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            FlowError::Network(_) => Some(FailureKind::Network),
            FlowError::Application { .. } => Some(FailureKind::Application),
            FlowError::EmptyQuery | FlowError::UnknownEntity(_) => None,
        }
    }
}

impl From<ApiError> for FlowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => FlowError::Network(msg),
            // Unparseable answers are treated like requests that never completed
            ApiError::Decode(msg) => FlowError::Network(format!("unreadable response: {msg}")),
            ApiError::Status { status, body } => FlowError::Application {
                code: i64::from(status),
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
            },
            ApiError::Application { code, message } => FlowError::application(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_onto_failure_kinds() {
        let network: FlowError = ApiError::Network("refused".into()).into();
        let decode: FlowError = ApiError::Decode("eof".into()).into();
        let status: FlowError = ApiError::Status {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        let app: FlowError = ApiError::Application {
            code: 401,
            message: "login required".into(),
        }
        .into();

        assert_eq!(network.kind(), Some(FailureKind::Network));
        assert_eq!(decode.kind(), Some(FailureKind::Network));
        assert_eq!(status.kind(), Some(FailureKind::Application));
        assert_eq!(app.kind(), Some(FailureKind::Application));
        assert_eq!(app.to_string(), "login required");
        assert_eq!(
            status,
            FlowError::Application {
                code: 502,
                message: "bad gateway".into()
            }
        );
    }

    #[test]
    fn empty_server_message_falls_back_to_code() {
        let err: FlowError = ApiError::Application {
            code: 500,
            message: String::new(),
        }
        .into();

        assert_eq!(err.to_string(), "Request failed (code 500)");
        assert_eq!(
            FlowError::application(403, "not allowed").to_string(),
            "not allowed"
        );
    }

    #[test]
    fn validation_errors_have_no_failure_kind() {
        assert_eq!(FlowError::EmptyQuery.kind(), None);
        assert_eq!(FlowError::UnknownEntity(3).kind(), None);
    }
}

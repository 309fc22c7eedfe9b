//! Error types for backend requests.

use std::fmt;

use dbwatch_types::Category;
use thiserror::Error;

/// Shorthand for results of backend calls.
pub type ApiResult<T> = Result<T, ClientError>;

/// The backend answered, but not with success.
///
/// Raised for a non-2xx status and for a 2xx envelope with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RequestError {
    pub method: &'static str,
    pub endpoint: String,
    /// HTTP status of the response.
    pub status: Option<u16>,
    /// Server-provided text, or a short description when there was none.
    pub reason: String,
}

impl RequestError {
    pub fn new(
        method: &'static str,
        endpoint: impl Into<String>,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            status,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)?;
        if let Some(status) = self.status {
            write!(f, ": {}", status)?;
        }
        write!(f, " - {}", self.reason)
    }
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend rejected the request.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Timeout waiting for response.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// Connection failed.
    #[error("connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Failed to parse response.
    #[error("failed to parse response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    /// The monitoring payload named a different category than requested.
    #[error("{endpoint} returned {actual} data, expected {expected}")]
    WrongCategory {
        endpoint: String,
        expected: Category,
        actual: Category,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Classify a reqwest failure for the given endpoint.
    pub(crate) fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        let endpoint = endpoint.to_string();
        if err.is_timeout() {
            ClientError::Timeout { endpoint }
        } else if err.is_decode() {
            ClientError::Parse {
                endpoint,
                reason: err.to_string(),
            }
        } else {
            ClientError::Connection {
                endpoint,
                reason: err.to_string(),
            }
        }
    }

    pub(crate) fn parse(endpoint: &str, err: impl fmt::Display) -> Self {
        ClientError::Parse {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }

    /// HTTP status when the backend answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request(e) => e.status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = RequestError::new("POST", "/api/v1/config/redis", Some(500), "disk full");
        assert_eq!(err.to_string(), "POST /api/v1/config/redis: 500 - disk full");

        let err = RequestError::new("GET", "/api/v1/config/kafka", None, "request failed");
        assert_eq!(err.to_string(), "GET /api/v1/config/kafka - request failed");
    }

    #[test]
    fn test_status_only_for_request_errors() {
        let err: ClientError = RequestError::new("GET", "/x", Some(404), "missing").into();
        assert_eq!(err.status(), Some(404));

        let err = ClientError::Timeout {
            endpoint: "/x".to_string(),
        };
        assert_eq!(err.status(), None);
    }
}

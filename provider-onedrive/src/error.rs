//! Error types for the OneDrive provider

use std::path::PathBuf;

use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

use crate::types::GraphErrorResponse;

/// OneDrive provider errors
#[derive(Error, Debug)]
pub enum OneDriveError {
    /// An operation that needs a signed-in handle was called without one
    #[error("No active OneDrive session")]
    NoActiveSession,

    /// Sign-in, token refresh or sign-out failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The API answered with a non-success status.
    ///
    /// `message` is the service's own text, shown as-is.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A local file could not be read for upload
    #[error("Failed to read local file {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport error from the host HTTP client
    #[error(transparent)]
    Bridge(BridgeError),
}

/// Result type for OneDrive operations
pub type Result<T> = std::result::Result<T, OneDriveError>;

impl OneDriveError {
    /// Build an [`OneDriveError::Api`] from a failed response.
    ///
    /// The `{"error": {"code", "message"}}` envelope is unwrapped when
    /// present; otherwise the raw body becomes the message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<GraphErrorResponse>(body) {
            Ok(envelope) => OneDriveError::Api {
                status,
                code: Some(envelope.error.code),
                message: envelope.error.message,
            },
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                OneDriveError::Api {
                    status,
                    code: None,
                    message: if text.is_empty() {
                        format!("Request failed with status {}", status)
                    } else {
                        text
                    },
                }
            }
        }
    }
}

impl From<BridgeError> for OneDriveError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::HttpStatus { status, body } => {
                OneDriveError::from_response(status, body.as_bytes())
            }
            other => OneDriveError::Bridge(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_message_passthrough() {
        let body = br#"{"error":{"code":"itemNotFound","message":"Item does not exist"}}"#;
        let error = OneDriveError::from_response(404, body);

        assert_eq!(error.to_string(), "Item does not exist");
        assert!(matches!(
            error,
            OneDriveError::Api { status: 404, code: Some(ref c), .. } if c == "itemNotFound"
        ));
    }

    #[test]
    fn test_plain_body_passthrough() {
        let error = OneDriveError::from_response(502, b"Bad Gateway");
        assert_eq!(error.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_empty_body() {
        let error = OneDriveError::from_response(500, b"");
        assert_eq!(error.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_bridge_status_becomes_api_error() {
        let error: OneDriveError = BridgeError::HttpStatus {
            status: 401,
            body: r#"{"error":{"code":"unauthenticated","message":"Token expired"}}"#.to_string(),
        }
        .into();

        assert!(matches!(error, OneDriveError::Api { status: 401, .. }));
        assert_eq!(error.to_string(), "Token expired");
    }

    #[test]
    fn test_transport_error_is_kept() {
        let error: OneDriveError = BridgeError::OperationFailed("connection reset".to_string()).into();
        assert_eq!(error.to_string(), "Bridge operation failed: connection reset");
    }

    #[test]
    fn test_local_file_error_display() {
        let error = OneDriveError::LocalFile {
            path: PathBuf::from("/tmp/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to read local file /tmp/missing.txt: No such file"
        );
    }
}

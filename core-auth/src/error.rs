use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The authorization server redirected back with an `error` parameter.
    /// Displays the provider's description as-is.
    #[error("{description}")]
    AuthorizationDenied { error: String, description: String },

    #[error("Sign-in cancelled: {0}")]
    Cancelled(String),

    #[error("OAuth state mismatch: expected '{expected}', got '{actual}'")]
    StateMismatch { expected: String, actual: String },

    /// Token endpoint rejected the code; carries the provider's message
    #[error("{0}")]
    InvalidAuthCode(String),

    #[error("{0}")]
    TokenRefreshFailed(String),

    #[error("{0}")]
    LogoutFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl From<bridge_traits::BridgeError> for AuthError {
    fn from(error: bridge_traits::BridgeError) -> Self {
        match error {
            bridge_traits::BridgeError::Cancelled(msg) => AuthError::Cancelled(msg),
            other => AuthError::NetworkError(other.to_string()),
        }
    }
}

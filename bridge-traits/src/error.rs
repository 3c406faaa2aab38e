use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The remote end answered with a non-success status. The body is kept
    /// verbatim so callers can surface the provider's own message.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The user dismissed or aborted an interactive flow.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

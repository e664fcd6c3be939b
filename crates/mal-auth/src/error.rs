//! Error types for OAuth authentication operations

/// Errors from OAuth authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token endpoint returned {status}: {body}")]
    Exchange { status: u16, body: String },

    #[error("no authorization code received within {secs}s")]
    Timeout { secs: u64 },

    #[error("invalid token payload: {0}")]
    TokenParse(String),

    #[error("failed to bind callback listener: {0}")]
    Bind(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

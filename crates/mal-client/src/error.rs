//! Error types for API client operations

use thiserror::Error;

/// Errors from API client operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(#[from] mal_auth::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The provider rejected the request because the access token expired.
    /// Distinct from [`Error::Api`] so callers can re-authenticate instead
    /// of aborting.
    #[error("the access token has expired")]
    TokenExpired,
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_display_carries_status_and_body() {
        let err = Error::Api {
            status: 404,
            body: "not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("not found"), "got: {msg}");
    }

    #[test]
    fn auth_errors_convert_via_from() {
        let err: Error = mal_auth::Error::Timeout { secs: 60 }.into();
        assert!(matches!(err, Error::Auth(_)));
    }
}

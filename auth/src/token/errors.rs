use thiserror::Error;

/// Error type for bearer token operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("Token is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Token must decode to {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

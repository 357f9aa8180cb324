use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for UserId validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("User ID must not be empty")]
    Empty,
}

/// Error for validity window construction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("Validity window starts after it ends")]
    StartAfterEnd,
}

/// Tag identifying which kind of failure an [`AuthError`] is.
///
/// Callers branch on this rather than on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    DuplicateKey,
    BadCredentials,
    InvalidToken,
    Internal,
}

/// Top-level error for credential and token operations.
///
/// `BadCredentials` covers both an unknown identifier and a wrong password.
/// `InvalidToken` covers unknown, malformed and expired tokens.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already registered: {0}")]
    DuplicateKey(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            AuthError::BadCredentials => ErrorKind::BadCredentials,
            AuthError::InvalidToken => ErrorKind::InvalidToken,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Prefix an internal failure with the operation that observed it.
    ///
    /// Other kinds pass through untouched so that callers can still match
    /// on them after propagation.
    pub fn context(self, operation: &str) -> Self {
        match self {
            AuthError::Internal(msg) => AuthError::Internal(format!("{}: {}", operation, msg)),
            other => other,
        }
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<UserIdError> for AuthError {
    fn from(err: UserIdError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<WindowError> for AuthError {
    fn from(err: WindowError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<auth::TokenError> for AuthError {
    fn from(err: auth::TokenError) -> Self {
        match err {
            auth::TokenError::RandomSourceUnavailable(msg) => {
                AuthError::Internal(format!("read random: {}", msg))
            }
            auth::TokenError::InvalidEncoding(_) | auth::TokenError::InvalidLength { .. } => {
                AuthError::Validation(err.to_string())
            }
        }
    }
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

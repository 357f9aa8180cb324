use axum::http::header::LOCATION;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use crate::domain::access::errors::AuthError;

pub mod login;
pub mod secured;
pub mod signup;

/// Body sent for every rejected login, whichever credential was wrong.
pub const BAD_CREDENTIALS_MESSAGE: &str = "invalid credentials";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, message).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadCredentials => {
                ApiError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::InvalidToken => ApiError::Unauthorized("invalid token".to_string()),
            AuthError::Validation(_) | AuthError::DuplicateKey(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AuthError::Internal(_) => {
                ApiError::InternalServerError("internal server error".to_string())
            }
        }
    }
}

/// Query parameters shared by the login and signup pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RedirectParams {
    pub redirect: Option<String>,
}

/// Fields posted by the login and signup forms.
#[derive(Clone, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Result<Response, ApiError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| ApiError::BadRequest(format!("invalid redirect target: {}", location)))?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

/// Method fallback for the auth pages, which accept only GET and POST.
pub async fn reject_method(method: Method) -> ApiError {
    ApiError::BadRequest(format!("invalid method: {}", method))
}

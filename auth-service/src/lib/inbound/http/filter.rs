use std::sync::Arc;

use auth::Token;
use auth::TokenError;
use axum::extract::OriginalUri;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use thiserror::Error;

use super::handlers::found;
use crate::domain::access::errors::AuthError;
use crate::domain::access::ports::Validator;

/// Name of the cookie carrying the bearer token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Extension type carrying the validated token to the protected handler
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedToken(pub Token);

/// Why a request was sent back to the login page.
///
/// Logged server-side only; the client sees the same redirect for all three.
#[derive(Debug, Error)]
enum Rejection {
    #[error("no auth_token cookie")]
    NoCookie,

    #[error("malformed auth_token cookie: {0}")]
    ParseFailure(#[from] TokenError),

    #[error("token validation failed: {0}")]
    ValidationFailure(#[from] AuthError),
}

/// Gate in front of protected routes.
///
/// Requests without a live token are redirected to `login_url` with the
/// original request URL in the `redirect` query parameter.
#[derive(Clone)]
pub struct AuthFilter {
    validator: Arc<dyn Validator>,
    login_url: Arc<str>,
}

impl AuthFilter {
    pub fn new(validator: Arc<dyn Validator>, login_url: impl Into<String>) -> Self {
        Self {
            validator,
            login_url: Arc::from(login_url.into()),
        }
    }

    fn redirect_url(&self, original: &str) -> String {
        format!(
            "{}?redirect={}",
            self.login_url,
            urlencoding::encode(original)
        )
    }

    async fn check(&self, jar: &CookieJar) -> Result<Token, Rejection> {
        let cookie = jar.get(AUTH_COOKIE).ok_or(Rejection::NoCookie)?;
        let token = Token::decode(cookie.value())?;
        self.validator.validate(&token).await?;
        Ok(token)
    }
}

/// Middleware that validates the auth cookie and hands the token to the next handler
pub async fn require_token(
    State(filter): State<AuthFilter>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let original = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.to_string())
        .unwrap_or_else(|| req.uri().to_string());

    match filter.check(&jar).await {
        Ok(token) => {
            req.extensions_mut().insert(AuthenticatedToken(token));
            next.run(req).await
        }
        Err(rejection) => {
            tracing::warn!(
                reason = %rejection,
                uri = %original,
                "Redirecting to login"
            );
            found(&filter.redirect_url(&original)).unwrap_or_else(|e| e.into_response())
        }
    }
}

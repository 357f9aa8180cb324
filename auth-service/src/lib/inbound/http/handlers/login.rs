use axum::extract::rejection::FormRejection;
use axum::extract::Query;
use axum::extract::RawQuery;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::Html;
use axum::response::Response;
use axum::Form;
use chrono::SecondsFormat;

use super::found;
use super::ApiError;
use super::CredentialsForm;
use super::RedirectParams;
use crate::domain::access::models::IssuedToken;
use crate::domain::access::ports::AuthServicePort;
use crate::inbound::http::filter::AUTH_COOKIE;
use crate::inbound::http::pages;
use crate::inbound::http::router::AppState;

pub async fn login_page(RawQuery(query): RawQuery) -> Html<String> {
    Html(pages::login_page(query.as_deref().unwrap_or("")))
}

pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(format!("parse form: {}", e)))?;
    let redirect = redirect_response(params)?;

    complete_login(&state, redirect, &form).await
}

/// `302 Found` to `redirect` (or `/`). Callers build it before persisting anything.
pub(super) fn redirect_response(params: RedirectParams) -> Result<Response, ApiError> {
    let location = params
        .redirect
        .filter(|redirect| !redirect.is_empty())
        .unwrap_or_else(|| "/".to_string());

    found(&location)
}

/// Authenticate, then attach the auth cookie to `redirect`.
pub(super) async fn complete_login(
    state: &AppState,
    mut redirect: Response,
    form: &CredentialsForm,
) -> Result<Response, ApiError> {
    let issued = state
        .auth_service
        .authenticate(&form.email, &form.password)
        .await
        .map_err(|e| {
            // Full detail stays in the logs; the client gets the generic mapping
            tracing::warn!(error = %e, "Login failed");
            ApiError::from(e)
        })?;

    let cookie = auth_cookie(&issued)?;
    redirect.headers_mut().insert(SET_COOKIE, cookie);
    Ok(redirect)
}

/// `auth_token=<base64>; Expires=<RFC 3339 end time>; Secure; Path=/`
fn auth_cookie(issued: &IssuedToken) -> Result<HeaderValue, ApiError> {
    let value = format!(
        "{}={}; Expires={}; Secure; Path=/",
        AUTH_COOKIE,
        issued.token.encode(),
        issued
            .window
            .end()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    HeaderValue::from_str(&value)
        .map_err(|e| ApiError::InternalServerError(format!("build cookie: {}", e)))
}

use axum::extract::rejection::FormRejection;
use axum::extract::Query;
use axum::extract::RawQuery;
use axum::extract::State;
use axum::response::Html;
use axum::response::Response;
use axum::Form;

use super::login::complete_login;
use super::login::redirect_response;
use super::ApiError;
use super::CredentialsForm;
use super::RedirectParams;
use crate::domain::access::errors::AuthError;
use crate::domain::access::models::EmailAddress;
use crate::domain::access::models::RegisterCommand;
use crate::domain::access::ports::AuthServicePort;
use crate::inbound::http::pages;
use crate::inbound::http::router::AppState;

pub async fn signup_page(RawQuery(query): RawQuery) -> Html<String> {
    Html(pages::signup_page(query.as_deref().unwrap_or("")))
}

/// Register the user, then log them in with the same credentials.
pub async fn signup(
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(format!("parse form: {}", e)))?;
    let redirect = redirect_response(params)?;

    let email = EmailAddress::new(form.email.clone())
        .map_err(|e| ApiError::from(AuthError::from(e)))?;
    let command = RegisterCommand::for_email(email, form.password.clone());

    state.auth_service.register(command).await.map_err(|e| {
        tracing::warn!(error = %e, "Signup failed");
        match e {
            AuthError::Internal(_) => ApiError::from(e),
            _ => ApiError::BadRequest(format!("create user: {}", e)),
        }
    })?;

    complete_login(&state, redirect, &form).await
}

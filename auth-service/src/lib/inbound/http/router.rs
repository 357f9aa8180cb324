use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::MethodFilter;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::filter::require_token;
use super::filter::AuthFilter;
use super::handlers::login::login;
use super::handlers::login::login_page;
use super::handlers::reject_method;
use super::handlers::secured::secured;
use super::handlers::signup::signup;
use super::handlers::signup::signup_page;
use crate::config::ServerConfig;
use crate::domain::access::service::AuthService;
use crate::outbound::repositories::SqliteAuthRepository;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<SqliteAuthRepository>>,
}

pub fn create_router(
    auth_service: Arc<AuthService<SqliteAuthRepository>>,
    server: &ServerConfig,
) -> Router {
    let filter = AuthFilter::new(auth_service.clone(), server.login_url.clone());
    let state = AppState { auth_service };

    // HEAD would otherwise fall through to the GET handler
    let auth_routes = Router::new()
        .route(
            "/login",
            get(login_page)
                .post(login)
                .on(MethodFilter::HEAD, reject_method)
                .fallback(reject_method),
        )
        .route(
            "/signup",
            get(signup_page)
                .post(signup)
                .on(MethodFilter::HEAD, reject_method)
                .fallback(reject_method),
        );

    let protected_routes = Router::new()
        .route("/secured", get(secured))
        .route_layer(middleware::from_fn_with_state(filter, require_token));

    // Request headers carry the auth cookie, so they stay out of the span
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    mount(&server.prefix, auth_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .with_state(state)
}

/// Nest `routes` under `prefix`; an empty or `/` prefix mounts them at the root.
fn mount(prefix: &str, routes: Router<AppState>) -> Router<AppState> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    }
}

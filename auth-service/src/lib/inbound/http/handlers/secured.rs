use axum::Extension;

use crate::inbound::http::filter::AuthenticatedToken;

/// Sample protected resource: echoes the caller's token.
pub async fn secured(
    Extension(AuthenticatedToken(token)): Extension<AuthenticatedToken>,
) -> String {
    token.encode()
}

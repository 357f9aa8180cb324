use std::sync::Arc;

use async_trait::async_trait;
use auth::Token;
use chrono::DateTime;
use chrono::Utc;

use super::errors::AuthError;
use super::models::IssuedToken;
use super::models::RegisterCommand;
use super::models::TokenPolicy;
use super::models::User;
use super::models::ValidityWindow;
use super::ports::AuthRepository;
use super::ports::AuthServicePort;
use super::ports::Validator;

/// Domain service implementation for credential and token operations.
///
/// Owns the token policy and the clock; the repository owns persistence
/// and transactions.
pub struct AuthService<R>
where
    R: AuthRepository,
{
    repository: Arc<R>,
    policy: TokenPolicy,
}

impl<R> AuthService<R>
where
    R: AuthRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential and token persistence implementation
    /// * `policy` - Lifetime and clock-skew allowance of issued tokens
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(repository: Arc<R>, policy: TokenPolicy) -> Self {
        Self { repository, policy }
    }
}

#[async_trait]
impl<R> AuthServicePort for AuthService<R>
where
    R: AuthRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        let user = self.repository.register(command).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let window =
            ValidityWindow::around(Utc::now(), self.policy.clock_skew, self.policy.lifetime)?;

        let issued = self
            .repository
            .verify_and_issue(email, password, window)
            .await
            .map_err(|e| e.context("authenticate"))?;

        tracing::info!(
            user_id = %issued.user_id,
            expires_at = %issued.window.end(),
            "Token issued"
        );

        Ok(issued)
    }

    async fn reap_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        self.repository
            .reap(cutoff)
            .await
            .map_err(|e| e.context("reap tokens"))
    }
}

#[async_trait]
impl<R> Validator for AuthService<R>
where
    R: AuthRepository,
{
    async fn validate(&self, token: &Token) -> Result<(), AuthError> {
        self.repository.lookup(token, Utc::now()).await.map(|_| ())
    }
}

use async_trait::async_trait;
use auth::Token;
use chrono::DateTime;
use chrono::Utc;

use super::errors::AuthError;
use super::models::IssuedToken;
use super::models::RegisterCommand;
use super::models::User;
use super::models::UserId;
use super::models::ValidityWindow;

/// Port for the operations exposed to the login and signup handlers.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated identifier, email and plaintext password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateKey` - Identifier or email is already registered
    /// * `Internal` - Hashing or storage failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Verify credentials and issue a token in one atomic unit.
    ///
    /// # Arguments
    /// * `email` - Email the user registered with
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// The issued token with its owner and validity window
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown user or wrong password
    /// * `Internal` - Transaction, random source or storage failed
    async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError>;

    /// Delete every token whose window ended before `cutoff`.
    ///
    /// # Returns
    /// Number of tokens removed
    ///
    /// # Errors
    /// * `Internal` - Storage failed
    async fn reap_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Yes/no gate over a presented token.
#[async_trait]
pub trait Validator: Send + Sync + 'static {
    /// Check that `token` exists and is live right now.
    ///
    /// # Errors
    /// * `InvalidToken` - Unknown or expired token
    /// * `Internal` - Storage failed
    async fn validate(&self, token: &Token) -> Result<(), AuthError>;
}

/// Persistence of user identities and password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Hash the password and persist a new user.
    ///
    /// # Errors
    /// * `DuplicateKey` - Identifier or email already exists
    /// * `Internal` - Hashing or storage failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Check a password for the user identified by id or by email.
    ///
    /// # Arguments
    /// * `identifier` - User ID or email address
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Identifier of the matching user
    ///
    /// # Errors
    /// * `BadCredentials` - No such user, or the password does not match
    /// * `Internal` - Storage failed or the stored hash is unreadable
    async fn verify_password(&self, identifier: &str, password: &str)
        -> Result<UserId, AuthError>;
}

/// Persistence of tokens and their validity windows.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Draw a fresh token for `user_id` and persist it with `window`.
    ///
    /// # Errors
    /// * `Internal` - Random source unavailable, or storage failed (a key
    ///   collision counts as a storage failure)
    async fn generate(
        &self,
        user_id: &UserId,
        window: ValidityWindow,
    ) -> Result<IssuedToken, AuthError>;

    /// Resolve the owner of `token` if it is live at `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - No such token, or `now` is outside its window
    /// * `Internal` - Storage failed
    async fn lookup(&self, token: &Token, now: DateTime<Utc>) -> Result<UserId, AuthError>;

    /// Delete all tokens whose window ended strictly before `cutoff`.
    ///
    /// # Returns
    /// Number of tokens removed (zero is success)
    ///
    /// # Errors
    /// * `Internal` - Storage failed
    async fn reap(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Store that can run the verify-then-issue sequence as one transaction.
#[async_trait]
pub trait AuthRepository: CredentialStore + TokenStore {
    /// Verify `password` for `email`, resolve the user and persist a token
    /// valid for `window`, committing only if every step succeeds.
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown email or wrong password
    /// * `Internal` - Transaction, random source or storage failed
    async fn verify_and_issue(
        &self,
        email: &str,
        password: &str,
        window: ValidityWindow,
    ) -> Result<IssuedToken, AuthError>;
}

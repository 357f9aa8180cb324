use std::future::Future;
use std::io::ErrorKind;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Token;
use chrono::DateTime;
use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Sqlite;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;

use super::credentials;
use super::tokens;
use crate::config::DatabaseConfig;
use crate::domain::access::errors::AuthError;
use crate::domain::access::models::IssuedToken;
use crate::domain::access::models::RegisterCommand;
use crate::domain::access::models::User;
use crate::domain::access::models::UserId;
use crate::domain::access::models::ValidityWindow;
use crate::domain::access::ports::AuthRepository;
use crate::domain::access::ports::CredentialStore;
use crate::domain::access::ports::TokenStore;

/// Open a connection pool for `config.url`, creating the database file if needed.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(config.operation_timeout_ms));

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_millis(config.operation_timeout_ms))
        .connect_with(options)
        .await
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Delete the database file named by `url`, with its WAL and shared-memory
/// siblings. In-memory databases and missing files are left alone.
pub async fn clear(url: &str) -> Result<(), std::io::Error> {
    let Some(path) = database_path(url) else {
        return Ok(());
    };

    for suffix in ["", "-wal", "-shm"] {
        let file = format!("{}{}", path, suffix);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => tracing::warn!(path = %file, "Removed database file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// File path part of a `sqlite:` URL, or None for an in-memory database.
fn database_path(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

/// SQLite-backed credential and token store.
///
/// Every operation runs under `operation_timeout`; when the deadline passes
/// the in-flight future is dropped, which rolls back any open transaction.
pub struct SqliteAuthRepository {
    pool: SqlitePool,
    password_hasher: PasswordHasher,
    operation_timeout: Duration,
}

impl SqliteAuthRepository {
    pub fn new(
        pool: SqlitePool,
        password_hasher: PasswordHasher,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            password_hasher,
            operation_timeout,
        }
    }

    async fn with_deadline<T, F>(&self, operation: &str, work: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        tokio::time::timeout(self.operation_timeout, work)
            .await
            .map_err(|_| AuthError::Internal(format!("{}: deadline exceeded", operation)))?
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, AuthError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AuthError::Internal(format!("acquire connection: {}", e)))
    }

    async fn verify_with(
        &self,
        conn: &mut SqliteConnection,
        identifier: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        let row = credentials::find_credentials(conn, identifier)
            .await
            .map_err(|e| AuthError::Internal(format!("query user: {}", e)))?;

        self.check_password(row, password)
    }

    /// Compare `password` against a fetched `(id, password_hash)` row.
    fn check_password(
        &self,
        row: Option<(String, String)>,
        password: &str,
    ) -> Result<UserId, AuthError> {
        // Unknown user and wrong password must be indistinguishable to the caller
        let (id, password_hash) = match row {
            Some(row) => row,
            None => return Err(AuthError::BadCredentials),
        };

        let matches = self
            .password_hasher
            .verify(password, &password_hash)
            .map_err(|e| AuthError::Internal(format!("compare password to hash: {}", e)))?;

        if !matches {
            return Err(AuthError::BadCredentials);
        }

        stored_user_id(id)
    }

    async fn generate_with(
        &self,
        conn: &mut SqliteConnection,
        user_id: &UserId,
        window: ValidityWindow,
    ) -> Result<IssuedToken, AuthError> {
        let token = Token::generate()?;

        // A key collision surfaces here as a constraint error; it is not retried
        tokens::insert_token(conn, &token, user_id, &window)
            .await
            .map_err(|e| AuthError::Internal(format!("insert: {}", e)))?;

        Ok(IssuedToken {
            token,
            user_id: user_id.clone(),
            window,
        })
    }
}

fn stored_user_id(id: String) -> Result<UserId, AuthError> {
    UserId::new(id).map_err(|e| AuthError::Internal(format!("stored user id: {}", e)))
}

#[async_trait]
impl CredentialStore for SqliteAuthRepository {
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| AuthError::Internal(format!("hash password: {}", e)))?;

        let user = User {
            id: command.id,
            email: command.email,
            password_hash,
            valid: false,
        };

        self.with_deadline("register user", async {
            let mut conn = self.acquire().await?;
            credentials::insert_user(&mut conn, &user)
                .await
                .map_err(|e| {
                    if let Some(db_err) = e.as_database_error() {
                        if db_err.is_unique_violation() {
                            return AuthError::DuplicateKey(format!(
                                "user '{}' or email '{}'",
                                user.id, user.email
                            ));
                        }
                    }
                    AuthError::Internal(format!("insert user: {}", e))
                })
        })
        .await?;

        Ok(user)
    }

    async fn verify_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        self.with_deadline("verify password", async {
            let mut conn = self.acquire().await?;
            self.verify_with(&mut conn, identifier, password).await
        })
        .await
    }
}

#[async_trait]
impl TokenStore for SqliteAuthRepository {
    async fn generate(
        &self,
        user_id: &UserId,
        window: ValidityWindow,
    ) -> Result<IssuedToken, AuthError> {
        self.with_deadline("generate token", async {
            let mut conn = self.acquire().await?;
            self.generate_with(&mut conn, user_id, window).await
        })
        .await
        .map_err(|e| e.context("generate token"))
    }

    async fn lookup(&self, token: &Token, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        self.with_deadline("lookup token", async {
            let mut conn = self.acquire().await?;
            let owner = tokens::find_live_owner(&mut conn, token, now)
                .await
                .map_err(|e| AuthError::Internal(format!("lookup token: {}", e)))?;

            match owner {
                Some(id) => stored_user_id(id),
                None => Err(AuthError::InvalidToken),
            }
        })
        .await
    }

    async fn reap(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        self.with_deadline("reap tokens", async {
            let mut conn = self.acquire().await?;
            tokens::delete_ended_before(&mut conn, cutoff)
                .await
                .map_err(|e| AuthError::Internal(format!("drop rows: {}", e)))
        })
        .await
    }
}

#[async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn verify_and_issue(
        &self,
        email: &str,
        password: &str,
        window: ValidityWindow,
    ) -> Result<IssuedToken, AuthError> {
        self.with_deadline("verify and issue", async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| AuthError::Internal(format!("open transaction: {}", e)))?;

            // Every early return drops `tx`, which rolls it back.
            // The row whose password is checked is the row that owns the token.
            let row = credentials::find_credentials_by_email(&mut tx, email)
                .await
                .map_err(|e| AuthError::Internal(format!("lookup email: {}", e)))?;

            let user_id = self
                .check_password(row, password)
                .map_err(|e| e.context("authorization"))?;

            let issued = self
                .generate_with(&mut tx, &user_id, window)
                .await
                .map_err(|e| e.context("generate token"))?;

            tx.commit()
                .await
                .map_err(|e| AuthError::Internal(format!("commit: {}", e)))?;

            Ok(issued)
        })
        .await
    }
}

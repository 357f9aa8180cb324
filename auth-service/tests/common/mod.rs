#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth_service::config::ServerConfig;
use auth_service::domain::access::models::TokenPolicy;
use auth_service::domain::access::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::sqlite;
use auth_service::outbound::repositories::SqliteAuthRepository;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub login_url: String,
    pub db: TestDb,
    pub repository: Arc<SqliteAuthRepository>,
    pub api_client: reqwest::Client,
}

/// Test database helper
pub struct TestDb {
    pub pool: SqlitePool,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let db = TestDb::new().await;

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);
        let login_url = format!("{}/auth/login", address);

        let server = ServerConfig {
            listen_address: format!("127.0.0.1:{}", port),
            prefix: "/auth".to_string(),
            login_url: login_url.clone(),
            request_timeout_secs: 30,
        };

        let repository = Arc::new(db.repository());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            TokenPolicy::default(),
        ));

        let router = create_router(auth_service, &server);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            login_url,
            db,
            repository,
            api_client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request carrying the auth cookie
    pub fn get_with_token(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path)
            .header(reqwest::header::COOKIE, format!("auth_token={}", token))
    }

    /// Helper to submit the signup form
    pub async fn signup(&self, query: &str, email: &str, password: &str) -> reqwest::Response {
        self.post(&format!("/auth/signup{}", query))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Helper to submit the login form
    pub async fn login(&self, query: &str, email: &str, password: &str) -> reqwest::Response {
        self.post(&format!("/auth/login{}", query))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }
}

impl TestDb {
    /// Create a fresh in-memory database with the schema applied
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Failed to parse database URL")
            .foreign_keys(true);

        // One connection that never recycles: the database lives as long as it does
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        sqlite::migrate(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool }
    }

    pub fn repository(&self) -> SqliteAuthRepository {
        self.repository_with_timeout(Duration::from_secs(5))
    }

    pub fn repository_with_timeout(&self, operation_timeout: Duration) -> SqliteAuthRepository {
        SqliteAuthRepository::new(self.pool.clone(), fast_hasher(), operation_timeout)
    }

    /// Number of token rows owned by `user_id`, expired or not
    pub async fn token_count(&self, user_id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count tokens")
    }
}

/// Minimal Argon2id work factor so tests stay fast
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(8, 1, 1).expect("Failed to build password hasher")
}

pub fn at_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

/// Token text from an `auth_token=<value>; ...` Set-Cookie header
pub fn cookie_token(response: &reqwest::Response) -> String {
    let header = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("Missing Set-Cookie header")
        .to_str()
        .expect("Set-Cookie is not ASCII");

    header
        .strip_prefix("auth_token=")
        .and_then(|rest| rest.split(';').next())
        .expect("Set-Cookie does not carry auth_token")
        .to_string()
}

use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Application configuration for auth-service.
///
/// Loaded once at start-up and handed to components; never mutated.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub token: TokenConfig,
    pub password: PasswordConfig,
    pub reaper: ReaperConfig,
    pub seed: Option<SeedUserConfig>,
}

/// SQLite database configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Deadline for any single store operation.
    pub operation_timeout_ms: u64,
    /// Test only: delete the database file before connecting.
    #[serde(default)]
    pub clear_on_start: bool,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub listen_address: String,
    /// Path the login and signup pages are mounted under.
    pub prefix: String,
    /// Where requests without a valid token are sent.
    pub login_url: String,
    pub request_timeout_secs: u64,
}

/// Lifetime of issued tokens.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub lifetime_hours: i64,
    /// Tokens become valid this long before the moment they are issued.
    pub clock_skew_ms: i64,
}

/// Argon2id work factor.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Expired token reaping schedule.
#[derive(Debug, Deserialize, Clone)]
pub struct ReaperConfig {
    pub interval_secs: u64,
    /// How far behind the current time the reap cutoff lags.
    pub grace_secs: i64,
}

/// User registered at start-up, with the email as its identifier.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUserConfig {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, SERVER__LISTEN_ADDRESS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=sqlite://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

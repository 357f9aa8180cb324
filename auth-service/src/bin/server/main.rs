use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth_service::config::Config;
use auth_service::config::SeedUserConfig;
use auth_service::domain::access::errors::AuthError;
use auth_service::domain::access::models::EmailAddress;
use auth_service::domain::access::models::RegisterCommand;
use auth_service::domain::access::models::TokenPolicy;
use auth_service::domain::access::ports::AuthServicePort;
use auth_service::domain::access::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::reaper::spawn_reaper;
use auth_service::outbound::repositories::sqlite;
use auth_service::outbound::repositories::SqliteAuthRepository;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        listen_address = %config.server.listen_address,
        prefix = %config.server.prefix,
        login_url = %config.server.login_url,
        token_lifetime_hours = config.token.lifetime_hours,
        "Configuration loaded"
    );

    if config.database.clear_on_start {
        tracing::warn!(database_url = %config.database.url, "Clearing database on start");
        sqlite::clear(&config.database.url).await?;
    }

    let pool = sqlite::connect(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "sqlite",
        "Database connection pool created"
    );

    sqlite::migrate(&pool).await?;
    tracing::info!(database = "sqlite", "Database migrations completed");

    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let repository = Arc::new(SqliteAuthRepository::new(
        pool,
        password_hasher,
        Duration::from_millis(config.database.operation_timeout_ms),
    ));
    let policy = TokenPolicy::new(
        chrono::Duration::hours(config.token.lifetime_hours),
        chrono::Duration::milliseconds(config.token.clock_skew_ms),
    );
    let auth_service = Arc::new(AuthService::new(repository, policy));

    if let Some(seed) = &config.seed {
        seed_user(auth_service.as_ref(), seed).await?;
    }

    let reaper = spawn_reaper(
        Arc::clone(&auth_service),
        Duration::from_secs(config.reaper.interval_secs),
        chrono::Duration::seconds(config.reaper.grace_secs),
    );

    let http_listener = tokio::net::TcpListener::bind(&config.server.listen_address).await?;
    tracing::info!(
        address = %config.server.listen_address,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(Arc::clone(&auth_service), &config.server);
    let http_server =
        tokio::spawn(async move { axum::serve(http_listener, http_application).await });

    // The reaper only ends if its task panics
    tokio::select! {
        result = http_server => match result {
            Ok(Ok(())) => tracing::info!("Server exited successfully"),
            Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
            Err(e) => tracing::error!(error = %e, "Server task error"),
        },
        result = reaper => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Reaper task error");
            }
        }
    }

    Ok(())
}

/// Register the configured start-up user; an existing registration is kept.
async fn seed_user<S>(service: &S, seed: &SeedUserConfig) -> Result<(), anyhow::Error>
where
    S: AuthServicePort,
{
    let email = EmailAddress::new(seed.email.clone())?;
    let command = RegisterCommand::for_email(email, seed.password.clone());

    match service.register(command).await {
        Ok(user) => tracing::info!(user_id = %user.id, "Seed user registered"),
        Err(AuthError::DuplicateKey(_)) => {
            tracing::info!(email = %seed.email, "Seed user already registered")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

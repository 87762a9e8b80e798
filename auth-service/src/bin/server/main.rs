use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::Authenticator;
use auth::HashCost;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenTtl;
use auth_service::config::Config;
use auth_service::config::LogFormat;
use auth_service::config::LoggingConfig;
use auth_service::identity::models::RegistrationPolicy;
use auth_service::identity::service::AuthService;
use auth_service::inbound::http::cookies::RefreshCookie;
use auth_service::inbound::http::handlers::health::HealthState;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::repositories::PostgresCredentialStore;
use auth_service::outbound::revocations::InMemoryRevocationList;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load().context("Invalid configuration")?;
    init_tracing(&config.logging);

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Service starting"
    );

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        store_timeout_ms = config.store.timeout_ms,
        revoke_on_rotation = config.session.revoke_on_rotation,
        log_format = ?config.logging.format,
        "Configuration loaded"
    );

    let health = Arc::new(HealthState::new(config.environment.clone()));
    let store_timeout = Duration::from_millis(config.store.timeout_ms);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(store_timeout)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(build_authenticator(&config)?);
    let credential_store = Arc::new(PostgresCredentialStore::new(
        pg_pool,
        authenticator.password_hasher().clone(),
    ));
    let revocations = Arc::new(InMemoryRevocationList::new());
    let policy = RegistrationPolicy {
        min_password_length: config.password.min_length,
        max_password_length: config.password.max_length,
    };

    let auth_service = Arc::new(
        AuthService::new(credential_store, revocations, Arc::clone(&authenticator), policy)
            .with_revoke_on_rotation(config.session.revoke_on_rotation),
    );

    let refresh_cookie = RefreshCookie {
        name: config.cookie.name.clone(),
        secure: config.cookie.secure,
        domain: config.cookie.domain.clone(),
        max_age: authenticator.ttl().refresh(),
    };
    if !refresh_cookie.secure {
        tracing::warn!("Refresh cookie is sent without the Secure attribute");
    }

    let http_application = create_router(AppState {
        auth_service,
        refresh_cookie,
        store_timeout,
        health: Arc::clone(&health),
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    health.mark_ready();

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_authenticator(config: &Config) -> Result<Authenticator, anyhow::Error> {
    let cost = HashCost {
        memory_kib: config.password.memory_kib,
        iterations: config.password.iterations,
        parallelism: config.password.parallelism,
    };
    let mut hasher = PasswordHasher::with_cost(cost).context("Invalid password hashing cost")?;
    if let Some(pepper) = &config.password.pepper {
        hasher = hasher.with_pepper(pepper.as_bytes());
    }

    let mut codec = TokenCodec::new(config.jwt.secret.as_bytes()).with_issuer(&config.jwt.issuer);
    if let Some(previous) = &config.jwt.previous_secret {
        codec = codec.with_previous_secret(previous.as_bytes());
        tracing::info!("Previous signing secret accepted for verification");
    }

    let ttl = TokenTtl::new(
        chrono::Duration::minutes(config.jwt.access_ttl_minutes),
        chrono::Duration::days(config.jwt.refresh_ttl_days),
    )
    .context("Invalid token lifetimes")?;

    Ok(Authenticator::new(hasher, codec, ttl))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgPoolOptions;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use warden_adapters::{
    Argon2Hasher, JwtTokenIssuer, LocalRateLimiter, LogEmailClient, PostgresCredentialStore,
    PostgresRateLimiter, PostmarkEmailClient, RandomCodeSource, Settings, SystemClock,
};
use warden_application::AuthEngine;
use warden_auth_service::AuthService;
use warden_core::{AppMode, Clock, Email, EmailClient, RateLimiter};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    // Load configuration
    let settings = Settings::load()?;

    // Setup database connection pool
    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(settings.database_url.expose_secret())
        .await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Shared deployments need the persisted counters; anything else can use
    // the process-local ones.
    let rate_limiter: Arc<dyn RateLimiter> = match settings.app_env {
        AppMode::Production => Arc::new(PostgresRateLimiter::new(pg_pool.clone(), clock.clone())),
        _ => Arc::new(LocalRateLimiter::new(clock.clone())),
    };

    let email_client: Arc<dyn EmailClient> = match settings.app_env {
        AppMode::Production => {
            let sender = settings
                .postmark_sender
                .clone()
                .ok_or_else(|| eyre!("POSTMARK_SENDER is required in production"))?;
            let auth_token = settings
                .postmark_auth_token
                .clone()
                .ok_or_else(|| eyre!("POSTMARK_AUTH_TOKEN is required in production"))?;
            let http_client = HttpClient::builder()
                .timeout(Duration::from_millis(settings.email_timeout_millis))
                .build()?;
            Arc::new(PostmarkEmailClient::new(
                settings.postmark_base_url.clone(),
                Email::try_from(Secret::from(sender))?,
                auth_token,
                http_client,
            ))
        }
        _ => Arc::new(LogEmailClient::new()),
    };

    let hasher = Arc::new(Argon2Hasher::new(
        settings.argon2_memory_kib,
        settings.argon2_iterations,
        settings.argon2_parallelism,
    )?);
    let token_issuer = Arc::new(JwtTokenIssuer::new(
        &settings.jwt_secret,
        settings.access_token_ttl_minutes,
        settings.refresh_token_ttl_days,
        clock.clone(),
    ));

    let engine = AuthEngine::new(
        PostgresCredentialStore::new(pg_pool),
        rate_limiter,
        email_client,
        hasher,
        token_issuer,
        clock,
        Arc::new(RandomCodeSource),
        settings.engine_config(),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.app_port)).await?;
    AuthService::new(engine)
        .run_standalone(listener, None)
        .await?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    let fmt_layer = fmt::layer().compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

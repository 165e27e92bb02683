use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ks_api::{create_app, AppState};
use ks_core::{Clock, SystemClock};
use ks_infra::InfrastructureServices;
use ks_shared::{AppConfig, LogFormat, LoggingConfig};

/// How often ended rate-limit windows are dropped
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        "Starting Keystone API Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid configuration: {}", reason))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let infra = InfrastructureServices::in_memory(clock.clone(), config.auth.bcrypt_cost)
        .context("failed to initialize infrastructure")?;
    infra.start_maintenance(RATE_LIMIT_PURGE_INTERVAL);

    let bind_address = config.server.bind_address();
    let state = web::Data::new(
        AppState::build(config, infra, clock).context("failed to build application state")?,
    );

    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || create_app(state.clone()).wrap(TracingLogger::default()))
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}

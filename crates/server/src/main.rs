mod api;
mod health;

use anyhow::Result;
use tarifa_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use tarifa_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let pool = tarifa_db::connect(&config.database).await?;
    let outcome = tarifa_db::migrations::run_pending(&pool).await?;
    tracing::info!(
        event_name = "system.migrations.applied",
        correlation_id = "bootstrap",
        newly_applied = outcome.newly_applied,
        total = outcome.total,
        "database schema is current"
    );

    let app = health::router(pool.clone())
        .merge(api::router(pool.clone(), config.leads.notification_email.clone()));

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "tarifa-server started"
    );

    axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "tarifa-server stopping"
    );

    pool.close().await;
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}

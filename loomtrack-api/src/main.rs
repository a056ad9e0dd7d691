//! loomtrack-api - Production and payroll tracker service
//!
//! Serves the REST API for daily loom production and worker attendance,
//! backed by a local SQLite database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loomtrack_api::{build_router, AppState};
use loomtrack_common::config::{self, ConfigOverrides};
use loomtrack_common::db::init_database;

/// Command-line arguments for loomtrack-api
#[derive(Parser, Debug)]
#[command(name = "loomtrack-api")]
#[command(about = "Production and payroll tracker API")]
#[command(version)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "LOOMTRACK_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(short, long, env = "LOOMTRACK_BIND")]
    bind: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long, env = "LOOMTRACK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "loomtrack_api=info,loomtrack_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting loomtrack-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let service_config = config::resolve(&ConfigOverrides {
        config_file: args.config,
        database: args.database,
        bind: args.bind,
    })
    .context("Failed to resolve configuration")?;

    info!("Database path: {}", service_config.database_path.display());

    let pool = match init_database(&service_config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool.clone()));

    let listener = tokio::net::TcpListener::bind(service_config.bind)
        .await
        .context("Failed to bind to address")?;
    info!("loomtrack-api listening on http://{}", service_config.bind);
    info!("Health check: http://{}/health", service_config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}

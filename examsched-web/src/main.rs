//! examsched-web - Exam schedule lookup service
//!
//! Serves the subject selection form and resolves submitted subjects against
//! the exam schedule sheet.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use examsched_common::config::{Config, ConfigOverrides};
use examsched_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for examsched-web
#[derive(Parser, Debug)]
#[command(name = "examsched-web")]
#[command(about = "Exam schedule lookup service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "EXAMSCHED_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "EXAMSCHED_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "EXAMSCHED_PORT")]
    port: Option<u16>,

    /// Newline-delimited subject list
    #[arg(long, env = "EXAMSCHED_SUBJECTS")]
    subjects: Option<PathBuf>,

    /// Schedule sheet exported as CSV
    #[arg(long, env = "EXAMSCHED_SCHEDULE")]
    schedule: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        subjects_path: args.subjects,
        schedule_path: args.schedule,
        log_level: args.log_level,
    };
    let config = Config::load(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any file access
    info!(
        "Starting examsched-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &args.config {
        Some(path) if path.exists() => info!("Configuration: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => info!("No config file given, using defaults"),
    }
    info!("Subject list: {}", config.sources.subjects_path.display());
    info!(
        "Schedule: {} (sheet '{}')",
        config.sources.schedule_path.display(),
        config.sources.sheet
    );
    if !config.sources.schedule_path.exists() {
        warn!(
            "Schedule file {} does not exist yet; /process will fail until it does",
            config.sources.schedule_path.display()
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("examsched-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

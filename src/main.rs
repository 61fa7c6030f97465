//! FileForge Server: web front end for document, image and media conversion.
//!
//! Main entry point that loads configuration, wires the converter into the
//! HTTP layer and runs the server until a shutdown signal.

use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use fileforge_api::{AppState, build_app};
use fileforge_converter::ConversionOrchestrator;
use fileforge_core::AppResult;
use fileforge_core::config::AppConfig;
use fileforge_core::error::AppError;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "fileforge-server", version, about = "File conversion web server")]
struct Cli {
    /// Directory containing `default.toml` and `<env>.toml`.
    #[arg(long, env = "FILEFORGE_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Environment overlay to load on top of the defaults.
    #[arg(long, env = "FILEFORGE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(config_dir = %cli.config_dir.display(), env = %cli.env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting FileForge v{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let orchestrator = ConversionOrchestrator::new(&config.converter, cancel.clone())?;
    if !orchestrator.media_available().await {
        tracing::warn!("Media tools will report a missing dependency until FFmpeg is installed");
    }

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let sweep_interval = Duration::from_secs(config.converter.sweep_interval_seconds);

    let state = AppState::new(config, orchestrator);
    let sweeper = tokio::spawn(run_sweeper(
        Arc::clone(&state.orchestrator),
        sweep_interval,
        cancel.clone(),
    ));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "FileForge server listening");

    let shutdown = cancel.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        shutdown.cancel();
    });

    let mut server = std::pin::pin!(server.into_future());
    tokio::select! {
        result = &mut server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            cancel.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    sweeper.abort();
    tracing::info!("FileForge server stopped");
    Ok(())
}

/// Periodically remove expired outputs until shutdown.
async fn run_sweeper(orchestrator: Arc<ConversionOrchestrator>, every: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = orchestrator.sweep_expired_outputs().await {
                    tracing::warn!(error = %e, "Retention sweep failed");
                }
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

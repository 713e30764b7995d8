//! htmx todos server
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `TODO_NAMESPACE`: Namespace holding the task list (default: `default`)
//! - `STATIC_DIR`: Directory served under `/static` (default: `public`)
//! - `SEED_TASKS`: Seed the in-memory store with two demo tasks (default: off)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `RUST_LOG`: Logging filter (default: `htmx_todos=debug,tower_http=debug`)
//! - `LOG_FORMAT`: `json` for JSON log lines, anything else for human-readable output

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use htmx_todos::api::{AppState, create_router};
use htmx_todos::infrastructure::{
    AppConfig, ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory,
};

const DEFAULT_LOG_FILTER: &str = "htmx_todos=debug,tower_http=debug";

/// Reasons the server stops before or while serving.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Repository(#[from] FactoryError),

    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(error) = run().await {
        tracing::error!(%error, "htmx todos stopped");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.trim() == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<(), StartupError> {
    tracing::info!("Starting htmx todos");

    let app_config = AppConfig::from_env()?;
    let repository_config = RepositoryConfig::from_env()?;

    tracing::info!(
        storage_mode = ?repository_config.storage_mode,
        namespace = %app_config.namespace,
        static_dir = %app_config.static_dir.display(),
        seed_tasks = app_config.seed_tasks,
        "Configuration loaded"
    );

    let task_repository = RepositoryFactory::new(repository_config)
        .create(app_config.seed())
        .await?;
    tracing::info!("Task repository initialized");

    let state = AppState::new(task_repository, app_config.namespace.clone());
    let application = create_router(state, &app_config.static_dir);

    let address = app_config.socket_addr()?;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

/// Resolves on the first stop request (Ctrl+C, or SIGTERM on Unix). A
/// signal whose handler cannot be installed is never waited on.
async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(error) => {
                tracing::warn!(%error, "Ctrl+C is not available as a stop signal");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(error) => {
                tracing::warn!(%error, "SIGTERM is not available as a stop signal");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    tracing::info!(signal = received, "Stopping, waiting for open requests to finish");
}

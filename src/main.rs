//! Task Notification API
//!
//! Serves the task CRUD endpoints, the auth endpoints and the `/events`
//! push channel, and runs the notification sweep in the background.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: Token signing secret (required)
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `NOTIFICATION_INTERVAL_SECS`: Sweep period in seconds (default: `10`)
//! - `EVENT_CHANNEL_CAPACITY`: Per-subscriber event buffer (default: `256`)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `info`, `task_notification_api=debug`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use task_notification_api::api::{AppState, build_router};
use task_notification_api::infrastructure::{
    InMemoryTaskRepository, InMemoryUserRepository, ServerConfig,
};
use task_notification_api::notification::{EventBroadcaster, NotificationSweep};

/// Result of parsing `WORKER_THREADS` environment variable.
struct WorkerThreadsResult {
    threads: Option<usize>,
    warning_emitted: bool,
}

fn parse_worker_threads() -> WorkerThreadsResult {
    let Ok(value) = std::env::var("WORKER_THREADS") else {
        return WorkerThreadsResult {
            threads: None,
            warning_emitted: false,
        };
    };

    match value.trim().parse::<usize>() {
        Ok(0) => {
            eprintln!("Warning: WORKER_THREADS=0 is invalid (must be > 0), using default");
            WorkerThreadsResult {
                threads: None,
                warning_emitted: true,
            }
        }
        Ok(threads) => WorkerThreadsResult {
            threads: Some(threads),
            warning_emitted: false,
        },
        Err(_) if value.trim().is_empty() => WorkerThreadsResult {
            threads: None,
            warning_emitted: false,
        },
        Err(error) => {
            eprintln!(
                "Warning: WORKER_THREADS='{value}' is not a valid number ({error}), using default"
            );
            WorkerThreadsResult {
                threads: None,
                warning_emitted: true,
            }
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let result = parse_worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if let Some(threads) = result.threads {
        builder.worker_threads(threads);
        if !result.warning_emitted {
            eprintln!("Tokio worker_threads set to: {threads}");
        }
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main());
}

async fn async_main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_notification_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Task Notification API");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = config.port,
        notification_interval = ?config.notification_interval,
        event_channel_capacity = config.event_channel_capacity,
        "Configuration loaded"
    );

    let address = match config.socket_address() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address");
            std::process::exit(1);
        }
    };

    let task_repository = Arc::new(InMemoryTaskRepository::new());
    let broadcaster = EventBroadcaster::new(config.event_channel_capacity);
    let application_state = AppState::new(
        task_repository.clone(),
        Arc::new(InMemoryUserRepository::new()),
        &config.jwt_secret,
        broadcaster.clone(),
    );

    let sweep = NotificationSweep::new(
        task_repository,
        broadcaster.clone(),
        config.notification_interval,
    )
    .spawn();

    let application = build_router(application_state);

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            sweep.stop().await;
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let served = axum::serve(listener, application)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            broadcaster.close();
        })
        .await;

    sweep.stop().await;

    if let Err(error) = served {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

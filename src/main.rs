//! Service entry point: configuration, logging, store bootstrap, the
//! background refresh worker, and the HTTP server.

use std::{path::PathBuf, sync::Arc, time::Instant};

use clap::Parser;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

mod catalog;
mod config;
mod db;
mod jobs;
mod observability;
mod refresh;
mod routes;
mod sources;

#[cfg(test)]
mod tests;

use catalog::CatalogStore;
use config::AppConfig;
use db::CatalogDb;
use refresh::Refresher;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub refresher: Arc<Refresher>,
    pub started_at: Instant,
}

#[derive(Parser, Debug)]
#[command(version, about = "modeldex - AI model metadata catalog service", long_about = None)]
struct Args {
    /// Path to config file (TOML). Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    observability::init_tracing(&config.observability.logging);

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.http.timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(config.http.connect_timeout_secs))
        .user_agent(config.http.user_agent.clone())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    // Persistence is best-effort: a failed open degrades to memory-only.
    let db = match config.catalog.db_file() {
        Some(path) => {
            if let Some(parent) = path.parent()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(error = %e, path = %parent.display(), "Failed to create data directory");
            }
            match CatalogDb::connect(&path).await {
                Ok(db) => Some(db),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "Failed to open catalog database, running without persistence"
                    );
                    None
                }
            }
        }
        None => None,
    };

    let store = Arc::new(CatalogStore::new(db));
    let restored = store.restore().await;
    if restored > 0 {
        tracing::info!(models = restored, "Serving persisted catalog until first refresh");
    }

    let refresher = Arc::new(Refresher::new(store.clone(), client, config.clone()));

    let task_tracker = TaskTracker::new();
    let cancel = CancellationToken::new();
    task_tracker.spawn(jobs::start_catalog_refresh_worker(
        refresher.clone(),
        config.refresh.clone(),
        cancel.clone(),
    ));

    let state = AppState {
        store,
        refresher,
        started_at: Instant::now(),
    };
    let app = routes::router(state);

    let addr = std::net::SocketAddr::new(config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(task_tracker, cancel))
        .await
        .unwrap();
}

/// Wait for SIGINT/SIGTERM, then stop background work and wait for
/// in-flight tasks. A refresh that already reached its publish step
/// finishes; one that has not yet published is abandoned.
async fn shutdown_signal(task_tracker: TaskTracker, cancel: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping background tasks");
    cancel.cancel();
    task_tracker.close();

    let wait_result =
        tokio::time::timeout(std::time::Duration::from_secs(30), task_tracker.wait()).await;
    match wait_result {
        Ok(()) => tracing::info!("All background tasks completed"),
        Err(_) => tracing::warn!("Timeout waiting for background tasks"),
    }
}

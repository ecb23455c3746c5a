//! Periodic catalog refresh worker.
//!
//! Runs an initial refresh immediately on startup, then one per configured
//! interval. A tick that loses the single-flight race to a manually
//! triggered refresh is skipped, not queued. The worker stops at the next
//! cancellation point; an in-flight run past the publish point finishes
//! normally.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::RefreshConfig,
    refresh::{Refresher, RefreshRun},
};

/// Run the refresh worker until cancelled.
///
/// Spawn this on the task tracker; it owns no state beyond the shared
/// [`Refresher`].
pub async fn start_catalog_refresh_worker(
    refresher: Arc<Refresher>,
    config: RefreshConfig,
    cancel: CancellationToken,
) {
    if !config.enabled {
        tracing::info!("Catalog refresh worker disabled by configuration");
        return;
    }

    tracing::info!(
        interval_secs = config.interval_secs,
        "Starting catalog refresh worker"
    );

    run_once(&refresher, &cancel).await;

    if config.interval_secs == 0 {
        tracing::info!("No refresh interval configured, worker exiting after initial run");
        return;
    }

    let interval = std::time::Duration::from_secs(config.interval_secs);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Catalog refresh worker stopping");
                return;
            }
            _ = tokio::time::sleep(interval) => {
                run_once(&refresher, &cancel).await;
            }
        }
    }
}

async fn run_once(refresher: &Refresher, cancel: &CancellationToken) {
    match refresher.run_cancellable(cancel).await {
        Ok(RefreshRun::Published(report)) => {
            tracing::info!(
                models_found = report.models_found,
                duration_ms = report.duration.as_millis() as u64,
                "Scheduled refresh complete"
            );
        }
        Ok(RefreshRun::Abandoned) => {}
        Err(_) => {
            tracing::debug!("Refresh already in progress, skipping scheduled run");
        }
    }
}

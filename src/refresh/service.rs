//! Single-flight refresh entry point shared by the HTTP trigger and the
//! periodic worker.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use super::{ProviderRefreshSummary, build_plans, refresh_all};
use crate::{
    catalog::{CatalogStore, RefreshInProgress},
    config::AppConfig,
};

/// What a completed (published) refresh run looked like.
#[derive(Debug)]
pub struct RefreshReport {
    pub models_found: usize,
    pub providers: Vec<ProviderRefreshSummary>,
    pub duration: Duration,
}

/// Outcome of a refresh attempt that was allowed to start.
#[derive(Debug)]
pub enum RefreshRun {
    Published(RefreshReport),
    /// Cancellation arrived before publish; the run was abandoned and the
    /// catalog is unchanged.
    Abandoned,
}

/// Owns everything needed to run a refresh: the source wiring, the shared
/// HTTP client, and the store to publish into.
pub struct Refresher {
    store: Arc<CatalogStore>,
    client: reqwest::Client,
    config: AppConfig,
}

impl Refresher {
    pub fn new(store: Arc<CatalogStore>, client: reqwest::Client, config: AppConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Run a refresh and publish the result.
    ///
    /// Fails fast with [`RefreshInProgress`] when another refresh holds the
    /// permit; callers decide how to surface that (the HTTP layer answers
    /// 409, the worker skips the tick).
    pub async fn run(&self) -> Result<RefreshReport, RefreshInProgress> {
        match self.run_inner(None).await? {
            RefreshRun::Published(report) => Ok(report),
            // Unreachable without a token, but harmless to map.
            RefreshRun::Abandoned => Ok(RefreshReport {
                models_found: 0,
                providers: Vec::new(),
                duration: Duration::ZERO,
            }),
        }
    }

    /// Like [`run`](Self::run), but abandons the run without publishing if
    /// `cancel` fires before the batch is handed to the store. Once publish
    /// starts it always completes.
    pub async fn run_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RefreshRun, RefreshInProgress> {
        self.run_inner(Some(cancel)).await
    }

    async fn run_inner(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<RefreshRun, RefreshInProgress> {
        let permit = self.store.begin_refresh()?;

        let outcome = refresh_all(
            build_plans(&self.config),
            &self.client,
            self.config.refresh.concurrency,
        )
        .await;

        if let Some(cancel) = cancel
            && cancel.is_cancelled()
        {
            tracing::info!("Shutdown requested before publish, abandoning refresh run");
            return Ok(RefreshRun::Abandoned);
        }

        let models_found = outcome.models.len();
        self.store.publish(&permit, outcome.models).await;

        Ok(RefreshRun::Published(RefreshReport {
            models_found,
            providers: outcome.providers,
            duration: outcome.duration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_refresher() -> Refresher {
        // Every upstream points at an unroutable address, so all network
        // sources fail fast and the run publishes the fallback universe.
        let mut config = AppConfig::default();
        for provider in [
            &mut config.providers.openai,
            &mut config.providers.anthropic,
            &mut config.providers.google,
        ] {
            provider.api_key = None;
            provider.base_url = Some("http://127.0.0.1:1".to_string());
        }
        config.refresh.catalog_feed_url = "http://127.0.0.1:1/api.json".to_string();
        config.retry.enabled = false;

        Refresher::new(
            Arc::new(CatalogStore::new(None)),
            reqwest::Client::new(),
            config,
        )
    }

    #[tokio::test]
    async fn offline_run_publishes_fallback_universe() {
        let refresher = offline_refresher();

        let report = refresher.run().await.unwrap();
        assert!(report.models_found > 0);
        assert_eq!(report.providers.len(), 3);
        assert!(report.providers.iter().all(|p| p.used_fallback));

        let snapshot = refresher.store().current();
        assert!(snapshot.models.contains_key("gpt-5.2"));
        assert!(snapshot.models.contains_key("claude-opus-4-5"));
        assert!(snapshot.models.contains_key("gemini-2.5-pro"));
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected() {
        let refresher = offline_refresher();

        let permit = refresher.store().begin_refresh().unwrap();
        assert!(refresher.run().await.is_err());
        drop(permit);

        assert!(refresher.run().await.is_ok());
    }

    #[tokio::test]
    async fn pre_cancelled_run_is_abandoned_without_publish() {
        let refresher = offline_refresher();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let run = refresher.run_cancellable(&cancel).await.unwrap();
        assert!(matches!(run, RefreshRun::Abandoned));
        assert!(refresher.store().current().is_empty());
    }
}

//! Refresh orchestrator: pulls every source, chooses each provider's id
//! universe, and merges per model.
//!
//! All network fetches of one run share a single bounded semaphore;
//! providers proceed in parallel, and a provider's enrichment fetches run
//! concurrently with its live fetch. No source or provider failure aborts
//! the run — a failed source simply contributes nothing, and a provider
//! whose every source failed contributes an empty set. The orchestrator
//! returns one complete batch; publishing is the store's job.

mod plans;
mod service;

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use futures::future::join_all;
pub use plans::build_plans;
pub use service::{RefreshReport, RefreshRun, Refresher};
use tokio::sync::Semaphore;

use crate::{
    catalog::{ModelRecord, SourceKind, SourcedPartial, merge},
    sources::{ModelSource, PartialsById},
};

/// Every source for one provider: the live API that establishes the id
/// universe, zero or more enrichment overlays, and the static fallback.
pub struct ProviderPlan {
    pub provider: String,
    pub live: Option<Box<dyn ModelSource>>,
    pub enrichment: Vec<Box<dyn ModelSource>>,
    pub fallback: Box<dyn ModelSource>,
}

/// Per-provider result of one refresh run.
#[derive(Debug, Clone)]
pub struct ProviderRefreshSummary {
    pub provider: String,
    pub model_count: usize,
    /// Whether the id universe came from the static fallback because the
    /// live API yielded zero ids.
    pub used_fallback: bool,
    pub failed_sources: usize,
}

/// Structured outcome of a whole refresh run.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// The complete merged batch across all providers.
    pub models: Vec<ModelRecord>,
    pub providers: Vec<ProviderRefreshSummary>,
    pub duration: Duration,
}

/// Run a full refresh across all configured providers.
///
/// `concurrency` caps outstanding upstream connections across the whole
/// run, not per provider.
pub async fn refresh_all(
    plans: Vec<ProviderPlan>,
    client: &reqwest::Client,
    concurrency: usize,
) -> RefreshOutcome {
    let start = Instant::now();
    let now = Utc::now();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let provider_results = join_all(
        plans
            .into_iter()
            .map(|plan| refresh_provider(plan, client, semaphore.clone(), now)),
    )
    .await;

    let mut models = Vec::new();
    let mut providers = Vec::with_capacity(provider_results.len());
    for (provider_models, summary) in provider_results {
        models.extend(provider_models);
        providers.push(summary);
    }

    let duration = start.elapsed();
    tracing::info!(
        models_found = models.len(),
        providers = providers.len(),
        duration_ms = duration.as_millis() as u64,
        "Refresh complete"
    );

    RefreshOutcome {
        models,
        providers,
        duration,
    }
}

async fn refresh_provider(
    plan: ProviderPlan,
    client: &reqwest::Client,
    semaphore: Arc<Semaphore>,
    now: DateTime<Utc>,
) -> (Vec<ModelRecord>, ProviderRefreshSummary) {
    let provider = plan.provider.clone();

    // Live and enrichment fetches run concurrently, each holding one
    // semaphore permit for the duration of its network call.
    let live_fut = async {
        match &plan.live {
            Some(source) => {
                let _permit = semaphore.acquire().await.ok();
                Some(fetch_source(source.as_ref(), client).await)
            }
            None => None,
        }
    };
    let enrichment_fut = join_all(plan.enrichment.iter().map(|source| {
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore.acquire().await.ok();
            (source.kind(), fetch_source(source.as_ref(), client).await)
        }
    }));

    let (live_result, enrichment_results) = tokio::join!(live_fut, enrichment_fut);

    // The fallback is embedded data; it does not consume a permit.
    let fallback_result = fetch_source(plan.fallback.as_ref(), client).await;

    let mut failed_sources = 0;
    let live = match live_result {
        Some(Ok(map)) => map,
        Some(Err(())) => {
            failed_sources += 1;
            PartialsById::new()
        }
        None => PartialsById::new(),
    };
    let fallback = match fallback_result {
        Ok(map) => map,
        Err(()) => {
            failed_sources += 1;
            PartialsById::new()
        }
    };

    // Layers in ascending priority: fallback, enrichment pages in
    // registration order, live API. The merge's stable sort preserves
    // registration order between equal-rank layers.
    let mut layers: Vec<(SourceKind, PartialsById)> =
        vec![(SourceKind::StaticFallback, fallback)];
    for (kind, result) in enrichment_results {
        match result {
            Ok(map) => layers.push((kind, map)),
            Err(()) => failed_sources += 1,
        }
    }

    // The live API owns the id universe; the fallback substitutes only
    // when the live source yielded zero ids.
    let used_fallback = live.is_empty();
    let universe: HashSet<String> = if used_fallback {
        tracing::warn!(
            provider = %provider,
            "Live API yielded no ids, using static fallback universe"
        );
        layers[0].1.keys().cloned().collect()
    } else {
        live.keys().cloned().collect()
    };
    layers.push((SourceKind::LiveApi, live));

    let mut models = Vec::with_capacity(universe.len());
    for id in &universe {
        let partials: Vec<SourcedPartial> = layers
            .iter()
            .filter_map(|(kind, map)| {
                map.get(id).map(|partial| SourcedPartial {
                    kind: *kind,
                    partial: partial.clone(),
                })
            })
            .collect();
        models.push(merge(id, &provider, partials, now));
    }

    tracing::info!(
        provider = %provider,
        model_count = models.len(),
        used_fallback = used_fallback,
        failed_sources = failed_sources,
        "Provider refresh complete"
    );

    let summary = ProviderRefreshSummary {
        provider,
        model_count: models.len(),
        used_fallback,
        failed_sources,
    };
    (models, summary)
}

/// Fetch one source, absorbing the error into a log line. The unit error
/// keeps failure counting at the call site trivial.
async fn fetch_source(
    source: &dyn ModelSource,
    client: &reqwest::Client,
) -> Result<PartialsById, ()> {
    match source.fetch(client).await {
        Ok(map) => Ok(map),
        Err(e) => {
            tracing::warn!(
                provider = source.provider(),
                source = %source.kind().label(),
                error = %e,
                "Source fetch failed, contributing nothing"
            );
            Err(())
        }
    }
}

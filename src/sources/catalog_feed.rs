//! Enrichment source backed by a models.dev-style catalog feed.
//!
//! The feed is one JSON document covering every provider; each provider's
//! refresh plan instantiates its own view of it so the merge sees a
//! regular per-provider source. Feed values rank above the static fallback
//! and below the provider's live API.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::{FetchError, ModelSource, PartialsById, with_retry};
use crate::{
    catalog::{PartialCapabilities, PartialModel, PartialPricing, SourceKind},
    config::RetryConfig,
};

pub struct CatalogFeedSource {
    provider: String,
    url: String,
    retry: RetryConfig,
}

/// Feed document: provider id → provider entry.
type FeedDocument = HashMap<String, FeedProvider>;

#[derive(Debug, Deserialize)]
struct FeedProvider {
    #[serde(default)]
    models: HashMap<String, FeedModel>,
}

/// One model entry in the feed. Every field optional: the feed only merges
/// what it actually states.
#[derive(Debug, Deserialize)]
struct FeedModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    attachment: Option<bool>,
    #[serde(default)]
    reasoning: Option<bool>,
    #[serde(default)]
    tool_call: Option<bool>,
    #[serde(default)]
    structured_output: Option<bool>,
    #[serde(default)]
    knowledge: Option<String>,
    #[serde(default)]
    cost: Option<FeedCost>,
    #[serde(default)]
    limit: Option<FeedLimit>,
}

#[derive(Debug, Deserialize)]
struct FeedCost {
    #[serde(default)]
    input: Option<f64>,
    #[serde(default)]
    output: Option<f64>,
    #[serde(default)]
    cache_read: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FeedLimit {
    #[serde(default)]
    context: Option<i64>,
    #[serde(default)]
    output: Option<i64>,
}

impl CatalogFeedSource {
    pub fn new(provider: impl Into<String>, url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            provider: provider.into(),
            url: url.into(),
            retry,
        }
    }

    async fn fetch_document(&self, client: &reqwest::Client) -> Result<FeedDocument, FetchError> {
        let response = client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response
            .json::<FeedDocument>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    fn to_partial(feed: FeedModel) -> PartialModel {
        let pricing = feed
            .cost
            .map(|c| PartialPricing {
                input_per_1m: c.input,
                output_per_1m: c.output,
                cached_input_per_1m: c.cache_read,
            })
            .unwrap_or_default();

        let (context_window, max_output_tokens) = feed
            .limit
            .map(|l| (l.context, l.output))
            .unwrap_or((None, None));

        PartialModel {
            name: feed.name,
            family: feed.family,
            knowledge_cutoff: feed.knowledge,
            context_window,
            max_output_tokens,
            capabilities: PartialCapabilities {
                vision: feed.attachment,
                reasoning: feed.reasoning,
                function_calling: feed.tool_call,
                structured_output: feed.structured_output,
                ..Default::default()
            },
            pricing,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ModelSource for CatalogFeedSource {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Enrichment { page: 1 }
    }

    #[tracing::instrument(
        skip(self, client),
        fields(source = "catalog_feed", provider = %self.provider)
    )]
    async fn fetch(&self, client: &reqwest::Client) -> Result<PartialsById, FetchError> {
        let document = with_retry(&self.retry, &self.provider, "catalog_feed", || {
            self.fetch_document(client)
        })
        .await?;

        let Some(entry) = document
            .into_iter()
            .find_map(|(id, provider)| (id == self.provider).then_some(provider))
        else {
            tracing::debug!("Provider absent from catalog feed");
            return Ok(PartialsById::new());
        };

        let partials: PartialsById = entry
            .models
            .into_iter()
            .filter(|(id, _)| !id.is_empty())
            .map(|(id, model)| (id, Self::to_partial(model)))
            .collect();

        tracing::info!(models_found = partials.len(), "Catalog feed fetch complete");
        Ok(partials)
    }
}

//! Anthropic live-API source: `GET /v1/models` with cursor pagination.
//!
//! Pages via `after_id`/`has_more` until the API signals no more pages or
//! returns an empty page. Each page request carries its own retry budget.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{FetchError, ModelSource, PartialsById, with_retry};
use crate::{
    catalog::{PartialModel, SourceKind},
    config::RetryConfig,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const PAGE_LIMIT: &str = "100";

pub struct AnthropicLiveSource {
    api_key: Option<String>,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct ModelsPage {
    data: Vec<ApiModel>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl AnthropicLiveSource {
    pub fn new(api_key: Option<String>, base_url: Option<String>, retry: RetryConfig) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            retry,
        }
    }

    async fn fetch_page(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        after_id: Option<&str>,
    ) -> Result<ModelsPage, FetchError> {
        let url = format!("{}/v1/models", self.base_url);
        let mut request = client
            .get(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .query(&[("limit", PAGE_LIMIT)]);
        if let Some(after_id) = after_id {
            request = request.query(&[("after_id", after_id)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response
            .json::<ModelsPage>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ModelSource for AnthropicLiveSource {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveApi
    }

    #[tracing::instrument(skip(self, client), fields(source = "anthropic_live"))]
    async fn fetch(&self, client: &reqwest::Client) -> Result<PartialsById, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No Anthropic API key configured, live source contributes nothing");
            return Ok(PartialsById::new());
        };

        let mut partials = PartialsById::new();
        let mut after_id: Option<String> = None;

        loop {
            let page = with_retry(&self.retry, "anthropic", "list_models", || {
                self.fetch_page(client, api_key, after_id.as_deref())
            })
            .await?;

            let page_empty = page.data.is_empty();
            after_id = page.data.last().map(|m| m.id.clone());

            for model in page.data {
                if model.id.is_empty() {
                    continue;
                }
                let created_at = model
                    .created_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|t| t.with_timezone(&Utc));
                partials.insert(
                    model.id,
                    PartialModel {
                        name: model.display_name,
                        provider: Some("anthropic".to_string()),
                        created_at,
                        ..Default::default()
                    },
                );
            }

            if !page.has_more || page_empty {
                break;
            }
        }

        tracing::info!(
            models_found = partials.len(),
            "Anthropic live fetch complete"
        );
        Ok(partials)
    }
}

//! OpenAI live-API source: `GET /v1/models`.
//!
//! The endpoint returns the full list in one page. Records carry little
//! beyond the id and creation timestamp; names, limits, and pricing come
//! from the enrichment and fallback layers.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::{FetchError, ModelSource, PartialsById, with_retry};
use crate::{
    catalog::{PartialModel, SourceKind},
    config::RetryConfig,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiLiveSource {
    api_key: Option<String>,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct ModelsPage {
    data: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    id: String,
    #[serde(default)]
    created: Option<i64>,
}

impl OpenAiLiveSource {
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
    ) -> Result<ModelsPage, FetchError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = client.get(&url).bearer_auth(api_key).send().await?;

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
impl ModelSource for OpenAiLiveSource {
    fn provider(&self) -> &str {
        "openai"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveApi
    }

    #[tracing::instrument(skip(self, client), fields(source = "openai_live"))]
    async fn fetch(&self, client: &reqwest::Client) -> Result<PartialsById, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No OpenAI API key configured, live source contributes nothing");
            return Ok(PartialsById::new());
        };

        let page = with_retry(&self.retry, "openai", "list_models", || {
            self.fetch_page(client, api_key)
        })
        .await?;

        let mut partials = PartialsById::with_capacity(page.data.len());
        for model in page.data {
            if model.id.is_empty() {
                continue;
            }
            let created_at = model.created.and_then(|t| DateTime::from_timestamp(t, 0));
            partials.insert(
                model.id,
                PartialModel {
                    provider: Some("openai".to_string()),
                    created_at,
                    ..Default::default()
                },
            );
        }

        tracing::info!(models_found = partials.len(), "OpenAI live fetch complete");
        Ok(partials)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            jitter: 0.0,
            ..Default::default()
        }
    }

    fn source(server: &MockServer) -> OpenAiLiveSource {
        OpenAiLiveSource::new(
            Some("sk-test".to_string()),
            Some(server.uri()),
            fast_retry(),
        )
    }

    #[tokio::test]
    async fn parses_model_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "gpt-5.2", "object": "model", "created": 1_700_000_000, "owned_by": "system"},
                    {"id": "gpt-5.2-pro", "object": "model", "created": 1_700_000_001, "owned_by": "system"},
                ]
            })))
            .mount(&server)
            .await;

        let partials = source(&server).fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(partials.len(), 2);
        assert!(partials["gpt-5.2"].created_at.is_some());
        assert_eq!(partials["gpt-5.2"].provider.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn missing_api_key_contributes_nothing() {
        let source = OpenAiLiveSource::new(None, None, fast_retry());
        let partials = source.fetch(&reqwest::Client::new()).await.unwrap();
        assert!(partials.is_empty());
    }

    #[tokio::test]
    async fn retries_500_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "gpt-5.2", "created": 1_700_000_000}]
            })))
            .mount(&server)
            .await;

        let partials = source(&server).fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(partials.len(), 1);
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let result = source(&server).fetch(&reqwest::Client::new()).await;
        assert!(matches!(result, Err(FetchError::Auth { status: 401 })));
    }

    #[tokio::test]
    async fn malformed_body_is_a_local_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = source(&server).fetch(&reqwest::Client::new()).await;
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }
}

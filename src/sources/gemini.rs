//! Gemini live-API source: `GET /v1beta/models` with page tokens.
//!
//! The API returns names like `models/gemini-2.5-pro`; the prefix is
//! stripped so ids line up with the other sources. Unlike the other live
//! APIs, this one reports context and output limits directly.

use async_trait::async_trait;
use serde::Deserialize;

use super::{FetchError, ModelSource, PartialsById, with_retry};
use crate::{
    catalog::{PartialModel, SourceKind},
    config::RetryConfig,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiLiveSource {
    api_key: Option<String>,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<ApiModel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_token_limit: Option<i64>,
    #[serde(default)]
    output_token_limit: Option<i64>,
}

impl GeminiLiveSource {
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
        page_token: Option<&str>,
    ) -> Result<ModelsPage, FetchError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let mut request = client.get(&url).query(&[("key", api_key)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
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
impl ModelSource for GeminiLiveSource {
    fn provider(&self) -> &str {
        "google"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveApi
    }

    #[tracing::instrument(skip(self, client), fields(source = "gemini_live"))]
    async fn fetch(&self, client: &reqwest::Client) -> Result<PartialsById, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No Gemini API key configured, live source contributes nothing");
            return Ok(PartialsById::new());
        };

        let mut partials = PartialsById::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = with_retry(&self.retry, "gemini", "list_models", || {
                self.fetch_page(client, api_key, page_token.as_deref())
            })
            .await?;

            let page_empty = page.models.is_empty();

            for model in page.models {
                let id = model
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&model.name)
                    .to_string();
                if id.is_empty() {
                    continue;
                }
                partials.insert(
                    id,
                    PartialModel {
                        name: model.display_name,
                        description: model.description,
                        provider: Some("google".to_string()),
                        context_window: model.input_token_limit,
                        max_output_tokens: model.output_token_limit,
                        ..Default::default()
                    },
                );
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() && !page_empty => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!(models_found = partials.len(), "Gemini live fetch complete");
        Ok(partials)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 1,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            jitter: 0.0,
            ..Default::default()
        }
    }

    fn source(server: &MockServer) -> GeminiLiveSource {
        GeminiLiveSource::new(
            Some("gm-test".to_string()),
            Some(server.uri()),
            fast_retry(),
        )
    }

    #[tokio::test]
    async fn follows_page_tokens_and_strips_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "models/gemini-2.5-flash", "displayName": "Gemini 2.5 Flash"},
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "models/gemini-2.5-pro", "displayName": "Gemini 2.5 Pro",
                     "inputTokenLimit": 1_048_576, "outputTokenLimit": 65_536},
                ],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;

        let partials = source(&server).fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(partials.len(), 2);
        assert_eq!(partials["gemini-2.5-pro"].context_window, Some(1_048_576));
        assert_eq!(partials["gemini-2.5-pro"].max_output_tokens, Some(65_536));
        assert!(partials.contains_key("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn single_page_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "models/gemini-2.5-pro"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let partials = source(&server).fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(partials.len(), 1);
    }
}

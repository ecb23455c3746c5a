//! Static-fallback source backed by an embedded table.
//!
//! Compiled into the binary, so it is always available. It is the
//! lowest-priority layer in every merge and the substitute id universe
//! when a provider's live API yields nothing.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{FetchError, ModelSource, PartialsById};
use crate::catalog::{PartialModel, SourceKind};

/// Last-resort model data, keyed by provider then model id.
const EMBEDDED_MODELS: &str = include_str!("../../data/static-models.json");

pub struct StaticFallbackSource {
    provider: String,
}

impl StaticFallbackSource {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl ModelSource for StaticFallbackSource {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn kind(&self) -> SourceKind {
        SourceKind::StaticFallback
    }

    async fn fetch(&self, _client: &reqwest::Client) -> Result<PartialsById, FetchError> {
        let mut table: HashMap<String, PartialsById> = serde_json::from_str(EMBEDDED_MODELS)
            .map_err(|e| FetchError::Malformed(format!("embedded fallback table: {e}")))?;

        let mut partials = table.remove(&self.provider).unwrap_or_default();
        for partial in partials.values_mut() {
            if partial.provider.is_none() {
                partial.provider = Some(self.provider.clone());
            }
        }
        Ok(partials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedded_table_parses_for_every_provider() {
        let client = reqwest::Client::new();
        for provider in ["openai", "anthropic", "google"] {
            let partials = StaticFallbackSource::new(provider)
                .fetch(&client)
                .await
                .expect("embedded table should parse");
            assert!(!partials.is_empty(), "{provider} should have fallback data");
        }
    }

    #[tokio::test]
    async fn known_entries_carry_expected_values() {
        let partials = StaticFallbackSource::new("openai")
            .fetch(&reqwest::Client::new())
            .await
            .unwrap();

        let gpt = &partials["gpt-5.2"];
        assert_eq!(gpt.name.as_deref(), Some("GPT-5.2"));
        assert_eq!(gpt.context_window, Some(400_000));
        assert_eq!(gpt.pricing.input_per_1m, Some(1.75));
        assert_eq!(gpt.capabilities.reasoning, Some(true));
        assert_eq!(gpt.provider.as_deref(), Some("openai"));

        let legacy = &partials["gpt-3.5-turbo"];
        assert_eq!(legacy.deprecated, Some(true));
    }

    #[tokio::test]
    async fn unknown_provider_contributes_nothing() {
        let partials = StaticFallbackSource::new("no-such-provider")
            .fetch(&reqwest::Client::new())
            .await
            .unwrap();
        assert!(partials.is_empty());
    }
}

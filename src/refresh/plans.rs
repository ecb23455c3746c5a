//! Wires configuration into per-provider source plans.

use crate::{
    config::AppConfig,
    sources::{
        AnthropicLiveSource, CatalogFeedSource, GeminiLiveSource, OpenAiLiveSource,
        StaticFallbackSource,
    },
};

use super::ProviderPlan;

/// Build the refresh plan for every enabled provider.
///
/// Each provider gets its live API source (skipped entirely only when the
/// provider is disabled; a missing API key just makes the source yield
/// nothing), one catalog-feed enrichment source, and the static fallback.
pub fn build_plans(config: &AppConfig) -> Vec<ProviderPlan> {
    let retry = &config.retry;
    let feed_url = &config.refresh.catalog_feed_url;
    let mut plans = Vec::new();

    if config.providers.openai.enabled {
        let provider = &config.providers.openai;
        plans.push(ProviderPlan {
            provider: "openai".to_string(),
            live: Some(Box::new(OpenAiLiveSource::new(
                provider.resolve_api_key("OPENAI_API_KEY"),
                provider.base_url.clone(),
                retry.clone(),
            ))),
            enrichment: vec![Box::new(CatalogFeedSource::new(
                "openai",
                feed_url.clone(),
                retry.clone(),
            ))],
            fallback: Box::new(StaticFallbackSource::new("openai")),
        });
    }

    if config.providers.anthropic.enabled {
        let provider = &config.providers.anthropic;
        plans.push(ProviderPlan {
            provider: "anthropic".to_string(),
            live: Some(Box::new(AnthropicLiveSource::new(
                provider.resolve_api_key("ANTHROPIC_API_KEY"),
                provider.base_url.clone(),
                retry.clone(),
            ))),
            enrichment: vec![Box::new(CatalogFeedSource::new(
                "anthropic",
                feed_url.clone(),
                retry.clone(),
            ))],
            fallback: Box::new(StaticFallbackSource::new("anthropic")),
        });
    }

    if config.providers.google.enabled {
        let provider = &config.providers.google;
        plans.push(ProviderPlan {
            provider: "google".to_string(),
            live: Some(Box::new(GeminiLiveSource::new(
                provider.resolve_api_key("GEMINI_API_KEY"),
                provider.base_url.clone(),
                retry.clone(),
            ))),
            enrichment: vec![Box::new(CatalogFeedSource::new(
                "google",
                feed_url.clone(),
                retry.clone(),
            ))],
            fallback: Box::new(StaticFallbackSource::new("google")),
        });
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_providers_planned_by_default() {
        let config = AppConfig::default();
        let plans = build_plans(&config);
        let names: Vec<&str> = plans.iter().map(|p| p.provider.as_str()).collect();
        assert_eq!(names, vec!["openai", "anthropic", "google"]);
        assert!(plans.iter().all(|p| p.live.is_some()));
        assert!(plans.iter().all(|p| p.enrichment.len() == 1));
    }

    #[test]
    fn disabled_provider_is_excluded() {
        let mut config = AppConfig::default();
        config.providers.anthropic.enabled = false;

        let plans = build_plans(&config);
        let names: Vec<&str> = plans.iter().map(|p| p.provider.as_str()).collect();
        assert_eq!(names, vec!["openai", "google"]);
    }
}

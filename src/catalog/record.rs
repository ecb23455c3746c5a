//! Resolved model records: the canonical, fully merged view of one model.
//!
//! A [`ModelRecord`] is produced by the merge engine and is immutable once
//! constructed. Unresolved scalar fields carry type-appropriate defaults
//! (empty string, `None`, `false`) rather than sentinel values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feature flags for a model.
///
/// Each flag is independent; a model may support any combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub reasoning: bool,
    #[serde(default)]
    pub function_calling: bool,
    #[serde(default)]
    pub structured_output: bool,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub fine_tuning: bool,
    #[serde(default)]
    pub logprobs: bool,
    #[serde(default)]
    pub json_mode: bool,
    #[serde(default)]
    pub distillation: bool,
    #[serde(default)]
    pub predicted_outputs: bool,
}

/// Pricing in dollars per 1M tokens.
///
/// `None` means no source reported a price for that component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_per_1m: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_per_1m: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_per_1m: Option<f64>,
}

/// The fully resolved record for one model after merging all sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model identifier. Unique across the whole catalog, case-sensitive.
    pub id: String,

    /// Human-readable display name. Empty when no source supplied one;
    /// display ordering falls back to the id.
    #[serde(default)]
    pub name: String,

    /// Model family (e.g., "gpt-5.2", "claude-opus"). Inferred from the id
    /// when no source supplies it.
    #[serde(default)]
    pub family: String,

    /// Owning provider id (e.g., "openai", "anthropic", "google").
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub description: String,

    /// Maximum context window size in tokens.
    #[serde(default)]
    pub context_window: Option<i64>,

    /// Maximum output tokens per response.
    #[serde(default)]
    pub max_output_tokens: Option<i64>,

    /// Knowledge cutoff, typically "YYYY-MM".
    #[serde(default)]
    pub knowledge_cutoff: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub capabilities: ModelCapabilities,

    #[serde(default)]
    pub pricing: ModelPricing,

    /// Supported API endpoints (e.g., "/v1/chat/completions").
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Upstream creation timestamp, when the provider reports one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When this record was last assembled by a refresh run.
    #[serde(default)]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ModelRecord {
    /// Display name for sorting and presentation, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Family patterns ordered most-specific first; the first match wins.
const FAMILY_PATTERNS: &[(&str, &str)] = &[
    ("gpt-5.2", "gpt-5.2"),
    ("gpt-5.1", "gpt-5.1"),
    ("gpt-5", "gpt-5"),
    ("gpt-4.1", "gpt-4.1"),
    ("gpt-4o", "gpt-4o"),
    ("gpt-4-turbo", "gpt-4"),
    ("gpt-4", "gpt-4"),
    ("gpt-3.5", "gpt-3.5"),
    ("gpt-oss", "gpt-oss"),
    ("o4", "o4"),
    ("o3", "o3"),
    ("o1", "o1"),
    ("claude-opus", "claude-opus"),
    ("claude-sonnet", "claude-sonnet"),
    ("claude-haiku", "claude-haiku"),
    ("claude-3-5", "claude-3.5"),
    ("claude-3", "claude-3"),
    ("gemini-3", "gemini-3"),
    ("gemini-2.5", "gemini-2.5"),
    ("gemini-2.0", "gemini-2.0"),
    ("gemini-1.5", "gemini-1.5"),
    ("dall-e", "dall-e"),
    ("tts", "tts"),
    ("whisper", "whisper"),
    ("text-embedding", "text-embedding"),
    ("text-moderation", "text-moderation"),
];

/// Infer the model family from a model id prefix.
///
/// Returns an empty string when no pattern matches; the merge engine only
/// consults this when no source supplied a family explicitly.
pub fn infer_family(model_id: &str) -> String {
    for (prefix, family) in FAMILY_PATTERNS {
        if model_id.starts_with(prefix) {
            return (*family).to_string();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::most_specific_first("gpt-5.2-codex", "gpt-5.2")]
    #[case::base_family("gpt-5-mini", "gpt-5")]
    #[case::turbo_maps_to_gpt4("gpt-4-turbo-2024-04-09", "gpt-4")]
    #[case::claude("claude-opus-4-5", "claude-opus")]
    #[case::gemini("gemini-2.5-pro", "gemini-2.5")]
    #[case::unknown("mystery-model-7b", "")]
    fn infer_family_matches_prefix(#[case] id: &str, #[case] family: &str) {
        assert_eq!(infer_family(id), family);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let record = ModelRecord {
            id: "gpt-5.2".to_string(),
            ..Default::default()
        };
        assert_eq!(record.display_name(), "gpt-5.2");

        let named = ModelRecord {
            id: "gpt-5.2".to_string(),
            name: "GPT-5.2".to_string(),
            ..Default::default()
        };
        assert_eq!(named.display_name(), "GPT-5.2");
    }

    #[test]
    fn record_serializes_round_trip() {
        let record = ModelRecord {
            id: "gpt-5.2".to_string(),
            name: "GPT-5.2".to_string(),
            family: "gpt-5.2".to_string(),
            provider: "openai".to_string(),
            context_window: Some(400_000),
            pricing: ModelPricing {
                input_per_1m: Some(1.75),
                output_per_1m: Some(14.0),
                cached_input_per_1m: Some(0.175),
            },
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ModelRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

//! Partial records: one source's view of one model.
//!
//! Every field is independently present-or-absent. Absence means "this
//! source said nothing about the field", which is distinct from a source
//! explicitly reporting an empty or false value — the merge engine keys on
//! presence, never on truthiness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The channel a partial record came from.
///
/// Kinds are totally ordered by [`SourceKind::rank`]; a higher rank wins
/// field-by-field during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Embedded last-resort data, consulted when everything else is silent.
    StaticFallback,
    /// A numbered enrichment feed (pricing/documentation overlays).
    /// Pages are 1-based; a higher page outranks a lower one.
    Enrichment { page: u8 },
    /// The provider's own model-listing API. Highest priority.
    LiveApi,
}

impl SourceKind {
    /// Global priority rank. Higher wins.
    pub fn rank(&self) -> u32 {
        match self {
            SourceKind::StaticFallback => 0,
            SourceKind::Enrichment { page } => u32::from(*page),
            SourceKind::LiveApi => u32::MAX,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> String {
        match self {
            SourceKind::StaticFallback => "static_fallback".to_string(),
            SourceKind::Enrichment { page } => format!("enrichment_{page}"),
            SourceKind::LiveApi => "live_api".to_string(),
        }
    }
}

/// Capability flags as reported by a single source.
///
/// `Some(false)` is a real statement ("this model cannot do X") and
/// overrides a lower-priority `Some(true)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCapabilities {
    pub vision: Option<bool>,
    pub reasoning: Option<bool>,
    pub function_calling: Option<bool>,
    pub structured_output: Option<bool>,
    pub streaming: Option<bool>,
    pub fine_tuning: Option<bool>,
    pub logprobs: Option<bool>,
    pub json_mode: Option<bool>,
    pub distillation: Option<bool>,
    pub predicted_outputs: Option<bool>,
}

/// Price components as reported by a single source, dollars per 1M tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPricing {
    pub input_per_1m: Option<f64>,
    pub output_per_1m: Option<f64>,
    pub cached_input_per_1m: Option<f64>,
}

impl PartialPricing {
    pub fn is_empty(&self) -> bool {
        self.input_per_1m.is_none()
            && self.output_per_1m.is_none()
            && self.cached_input_per_1m.is_none()
    }
}

/// One source's attribute bag for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialModel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context_window: Option<i64>,
    #[serde(default)]
    pub max_output_tokens: Option<i64>,
    #[serde(default)]
    pub knowledge_cutoff: Option<String>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub capabilities: PartialCapabilities,
    #[serde(default)]
    pub pricing: PartialPricing,
    #[serde(default)]
    pub endpoints: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

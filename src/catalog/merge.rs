//! Priority-layered merge of partial records into one resolved record.
//!
//! Partials are folded lowest-rank-first; a later partial overwrites any
//! field it explicitly defines, even when the new value is falsy. Absence
//! is the only thing that preserves an earlier layer's value. Pricing and
//! capabilities merge field-by-field inside the tuple, so a high-priority
//! source that only knows the input price does not erase a lower-priority
//! source's output price.

use chrono::{DateTime, Utc};

use super::{
    partial::{PartialModel, SourceKind},
    record::{ModelCapabilities, ModelPricing, ModelRecord, infer_family},
};

/// A partial record tagged with where it came from.
#[derive(Debug, Clone)]
pub struct SourcedPartial {
    pub kind: SourceKind,
    pub partial: PartialModel,
}

/// Merge all partials for one model into a resolved record.
///
/// `partials` may arrive in any order; they are stably sorted by ascending
/// rank before folding, so registration order breaks ties between sources
/// of equal rank (the later-registered source wins).
pub fn merge(
    model_id: &str,
    provider: &str,
    mut partials: Vec<SourcedPartial>,
    refreshed_at: DateTime<Utc>,
) -> ModelRecord {
    partials.sort_by_key(|p| p.kind.rank());

    let mut record = ModelRecord {
        id: model_id.to_string(),
        provider: provider.to_string(),
        refreshed_at: Some(refreshed_at),
        ..Default::default()
    };
    let mut family_supplied = false;
    let mut provider_supplied = false;

    for SourcedPartial { partial, .. } in partials {
        if let Some(name) = partial.name {
            record.name = name;
        }
        if let Some(family) = partial.family {
            record.family = family;
            family_supplied = true;
        }
        if let Some(provider) = partial.provider {
            record.provider = provider;
            provider_supplied = true;
        }
        if let Some(description) = partial.description {
            record.description = description;
        }
        if let Some(context_window) = partial.context_window {
            record.context_window = Some(context_window);
        }
        if let Some(max_output_tokens) = partial.max_output_tokens {
            record.max_output_tokens = Some(max_output_tokens);
        }
        if let Some(cutoff) = partial.knowledge_cutoff {
            record.knowledge_cutoff = Some(cutoff);
        }
        if let Some(deprecated) = partial.deprecated {
            record.deprecated = deprecated;
        }
        if let Some(endpoints) = partial.endpoints {
            record.endpoints = endpoints;
        }
        if let Some(created_at) = partial.created_at {
            record.created_at = Some(created_at);
        }

        merge_capabilities(&mut record.capabilities, &partial.capabilities);
        merge_pricing(&mut record.pricing, &partial.pricing);
    }

    // Inference fills gaps only; an explicit (even empty) value stands.
    if !family_supplied {
        record.family = infer_family(model_id);
    }
    if !provider_supplied {
        record.provider = provider.to_string();
    }

    record
}

fn merge_capabilities(
    resolved: &mut ModelCapabilities,
    partial: &super::partial::PartialCapabilities,
) {
    if let Some(v) = partial.vision {
        resolved.vision = v;
    }
    if let Some(v) = partial.reasoning {
        resolved.reasoning = v;
    }
    if let Some(v) = partial.function_calling {
        resolved.function_calling = v;
    }
    if let Some(v) = partial.structured_output {
        resolved.structured_output = v;
    }
    if let Some(v) = partial.streaming {
        resolved.streaming = v;
    }
    if let Some(v) = partial.fine_tuning {
        resolved.fine_tuning = v;
    }
    if let Some(v) = partial.logprobs {
        resolved.logprobs = v;
    }
    if let Some(v) = partial.json_mode {
        resolved.json_mode = v;
    }
    if let Some(v) = partial.distillation {
        resolved.distillation = v;
    }
    if let Some(v) = partial.predicted_outputs {
        resolved.predicted_outputs = v;
    }
}

fn merge_pricing(resolved: &mut ModelPricing, partial: &super::partial::PartialPricing) {
    if partial.is_empty() {
        return;
    }
    if let Some(v) = partial.input_per_1m {
        resolved.input_per_1m = Some(v);
    }
    if let Some(v) = partial.output_per_1m {
        resolved.output_per_1m = Some(v);
    }
    if let Some(v) = partial.cached_input_per_1m {
        resolved.cached_input_per_1m = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::partial::{PartialCapabilities, PartialPricing};

    fn sourced(kind: SourceKind, partial: PartialModel) -> SourcedPartial {
        SourcedPartial { kind, partial }
    }

    #[test]
    fn higher_rank_wins_regardless_of_fetch_order() {
        let low = sourced(
            SourceKind::Enrichment { page: 1 },
            PartialModel {
                name: Some("Old Name".to_string()),
                context_window: Some(1000),
                ..Default::default()
            },
        );
        let high = sourced(
            SourceKind::LiveApi,
            PartialModel {
                name: Some("New Name".to_string()),
                ..Default::default()
            },
        );

        // Same partials, both arrival orders.
        let a = merge("m1", "openai", vec![low.clone(), high.clone()], Utc::now());
        let b = merge("m1", "openai", vec![high, low], Utc::now());

        assert_eq!(a.name, "New Name");
        assert_eq!(b.name, "New Name");
        assert_eq!(a.context_window, Some(1000));
        assert_eq!(b.context_window, Some(1000));
    }

    #[test]
    fn explicit_falsy_value_overrides_lower_rank() {
        let fallback = sourced(
            SourceKind::StaticFallback,
            PartialModel {
                deprecated: Some(true),
                capabilities: PartialCapabilities {
                    vision: Some(true),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let live = sourced(
            SourceKind::LiveApi,
            PartialModel {
                deprecated: Some(false),
                capabilities: PartialCapabilities {
                    vision: Some(false),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let record = merge("m1", "openai", vec![fallback, live], Utc::now());
        assert!(!record.deprecated);
        assert!(!record.capabilities.vision);
    }

    #[test]
    fn pricing_fields_merge_independently() {
        // Low rank knows both prices; high rank only knows the input price.
        let low = sourced(
            SourceKind::StaticFallback,
            PartialModel {
                pricing: PartialPricing {
                    input_per_1m: Some(0.5),
                    output_per_1m: Some(1.5),
                    cached_input_per_1m: None,
                },
                ..Default::default()
            },
        );
        let high = sourced(
            SourceKind::Enrichment { page: 1 },
            PartialModel {
                pricing: PartialPricing {
                    input_per_1m: Some(1.75),
                    output_per_1m: None,
                    cached_input_per_1m: Some(0.175),
                },
                ..Default::default()
            },
        );

        let record = merge("gpt-5.2", "openai", vec![low, high], Utc::now());
        assert_eq!(record.pricing.input_per_1m, Some(1.75));
        assert_eq!(record.pricing.output_per_1m, Some(1.5));
        assert_eq!(record.pricing.cached_input_per_1m, Some(0.175));
    }

    #[test]
    fn two_source_scenario() {
        // Source A (rank 1) supplies the context window, source B (rank 2)
        // supplies the name; the merged record has both.
        let a = sourced(
            SourceKind::Enrichment { page: 1 },
            PartialModel {
                context_window: Some(1000),
                ..Default::default()
            },
        );
        let b = sourced(
            SourceKind::Enrichment { page: 2 },
            PartialModel {
                name: Some("Model One".to_string()),
                ..Default::default()
            },
        );

        let record = merge("m1", "openai", vec![a, b], Utc::now());
        assert_eq!(record.context_window, Some(1000));
        assert_eq!(record.name, "Model One");
    }

    #[test]
    fn absent_everywhere_yields_documented_defaults() {
        let record = merge("unknown-model", "openai", Vec::new(), Utc::now());

        assert_eq!(record.id, "unknown-model");
        assert_eq!(record.name, "");
        assert_eq!(record.description, "");
        assert_eq!(record.context_window, None);
        assert_eq!(record.max_output_tokens, None);
        assert_eq!(record.knowledge_cutoff, None);
        assert!(!record.deprecated);
        assert_eq!(record.capabilities, ModelCapabilities::default());
        assert_eq!(record.pricing, ModelPricing::default());
        assert!(record.endpoints.is_empty());
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn family_inferred_only_when_no_source_supplies_it() {
        let inferred = merge("gpt-5.2-codex", "openai", Vec::new(), Utc::now());
        assert_eq!(inferred.family, "gpt-5.2");

        let explicit = merge(
            "gpt-5.2-codex",
            "openai",
            vec![sourced(
                SourceKind::LiveApi,
                PartialModel {
                    family: Some("codex".to_string()),
                    ..Default::default()
                },
            )],
            Utc::now(),
        );
        assert_eq!(explicit.family, "codex");
    }

    #[test]
    fn equal_rank_later_registration_wins() {
        let first = sourced(
            SourceKind::Enrichment { page: 1 },
            PartialModel {
                name: Some("First".to_string()),
                ..Default::default()
            },
        );
        let second = sourced(
            SourceKind::Enrichment { page: 1 },
            PartialModel {
                name: Some("Second".to_string()),
                ..Default::default()
            },
        );

        // Stable sort keeps registration order within a rank; the fold then
        // lets the later layer override.
        let record = merge("m1", "openai", vec![first, second], Utc::now());
        assert_eq!(record.name, "Second");
    }
}

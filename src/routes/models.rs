//! Catalog read endpoints: list with filtering/sorting, lookup by id, and
//! the family grouping view.

use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::{AppState, catalog::ModelRecord};

/// Fields available for sorting model results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    InputPrice,
    OutputPrice,
    ContextWindow,
    #[default]
    Name,
    Created,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for `GET /models`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelFilterParams {
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
    pub family: Option<String>,
    pub provider: Option<String>,
    pub include_deprecated: bool,
    pub min_context: Option<i64>,
    pub max_input_price: Option<f64>,
    pub max_output_price: Option<f64>,
    pub sort: SortField,
    pub order: SortOrder,
    /// Case-insensitive substring search over id, name, and description.
    pub q: Option<String>,
}

/// Response for `GET /models`.
#[derive(Debug, Serialize)]
pub struct ModelsListResponse {
    pub count: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub models: Vec<ModelRecord>,
}

/// Response for `GET /families`.
#[derive(Debug, Serialize)]
pub struct FamiliesResponse {
    pub count: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
    /// Family name to member model ids, in display order.
    pub families: BTreeMap<String, Vec<String>>,
}

pub async fn list_models(
    State(state): State<AppState>,
    Query(params): Query<ModelFilterParams>,
) -> Json<ModelsListResponse> {
    let snapshot = state.store.current();

    let base = if params.include_deprecated {
        &snapshot.models_list
    } else {
        &snapshot.non_deprecated
    };

    let mut matched: Vec<&Arc<ModelRecord>> =
        base.iter().filter(|m| matches_filters(m, &params)).collect();
    sort_records(&mut matched, params.sort, params.order);

    Json(ModelsListResponse {
        count: matched.len(),
        last_refreshed: snapshot.last_refreshed,
        models: matched.into_iter().map(|m| m.as_ref().clone()).collect(),
    })
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelRecord>, ApiError> {
    state
        .store
        .get(&id)
        .map(|m| Json(m.as_ref().clone()))
        .ok_or_else(|| ApiError::not_found(format!("Model {id:?} not found")))
}

pub async fn list_families(State(state): State<AppState>) -> Json<FamiliesResponse> {
    let snapshot = state.store.current();

    let families: BTreeMap<String, Vec<String>> = snapshot
        .by_family
        .iter()
        .map(|(family, members)| {
            (
                family.clone(),
                members.iter().map(|m| m.id.clone()).collect(),
            )
        })
        .collect();

    Json(FamiliesResponse {
        count: families.len(),
        last_refreshed: snapshot.last_refreshed,
        families,
    })
}

fn matches_filters(model: &ModelRecord, params: &ModelFilterParams) -> bool {
    let caps = &model.capabilities;
    let capability_filters = [
        (params.vision, caps.vision),
        (params.reasoning, caps.reasoning),
        (params.function_calling, caps.function_calling),
        (params.structured_output, caps.structured_output),
        (params.streaming, caps.streaming),
        (params.fine_tuning, caps.fine_tuning),
        (params.logprobs, caps.logprobs),
        (params.json_mode, caps.json_mode),
        (params.distillation, caps.distillation),
        (params.predicted_outputs, caps.predicted_outputs),
    ];
    for (wanted, actual) in capability_filters {
        if let Some(wanted) = wanted
            && wanted != actual
        {
            return false;
        }
    }

    if let Some(family) = &params.family
        && model.family != *family
    {
        return false;
    }
    if let Some(provider) = &params.provider
        && model.provider != *provider
    {
        return false;
    }

    // Threshold filters exclude models that do not report the field.
    if let Some(min_context) = params.min_context
        && !model.context_window.is_some_and(|c| c >= min_context)
    {
        return false;
    }
    if let Some(max_input) = params.max_input_price
        && !model.pricing.input_per_1m.is_some_and(|p| p <= max_input)
    {
        return false;
    }
    if let Some(max_output) = params.max_output_price
        && !model.pricing.output_per_1m.is_some_and(|p| p <= max_output)
    {
        return false;
    }

    if let Some(q) = &params.q {
        let needle = q.to_lowercase();
        let haystack = format!(
            "{} {} {}",
            model.id.to_lowercase(),
            model.name.to_lowercase(),
            model.description.to_lowercase()
        );
        if !haystack.contains(&needle) {
            return false;
        }
    }

    true
}

fn sort_records(records: &mut [&Arc<ModelRecord>], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => {
                let cmp = a
                    .display_name()
                    .to_lowercase()
                    .cmp(&b.display_name().to_lowercase());
                apply_order(cmp, order)
            }
            SortField::InputPrice => {
                cmp_optional_f64(a.pricing.input_per_1m, b.pricing.input_per_1m, order)
            }
            SortField::OutputPrice => {
                cmp_optional_f64(a.pricing.output_per_1m, b.pricing.output_per_1m, order)
            }
            SortField::ContextWindow => cmp_optional(a.context_window, b.context_window, order),
            SortField::Created => cmp_optional(a.created_at, b.created_at, order),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// `None` sorts after any value, in either direction.
fn cmp_optional<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => apply_order(a.cmp(&b), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_optional_f64(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => apply_order(a.partial_cmp(&b).unwrap_or(Ordering::Equal), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

//! Manual refresh trigger.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ApiError;
use crate::AppState;

/// Response for `POST /refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub models_found: usize,
    pub duration_seconds: f64,
    pub refreshed_at: DateTime<Utc>,
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub provider: String,
    pub model_count: usize,
    pub used_fallback: bool,
    pub failed_sources: usize,
}

/// Run a refresh now. Answers 409 when one is already in flight; the
/// caller retries later rather than queueing behind the running one.
pub async fn trigger_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let report = state
        .refresher
        .run()
        .await
        .map_err(|e| ApiError::conflict(e.to_string()))?;

    Ok(Json(RefreshResponse {
        status: "completed".to_string(),
        models_found: report.models_found,
        duration_seconds: report.duration.as_secs_f64(),
        refreshed_at: Utc::now(),
        providers: report
            .providers
            .into_iter()
            .map(|p| ProviderSummary {
                provider: p.provider,
                model_count: p.model_count,
                used_fallback: p.used_fallback,
                failed_sources: p.failed_sources,
            })
            .collect(),
    }))
}

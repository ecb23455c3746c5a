//! Health endpoint.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub uptime_seconds: f64,
    pub version: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.current();

    Json(HealthResponse {
        status: "ok".to_string(),
        models_loaded: snapshot.len(),
        last_refreshed: snapshot.last_refreshed,
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

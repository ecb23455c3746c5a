//! HTTP surface: catalog reads, health, and the manual refresh trigger.
//!
//! Every read handler works against one snapshot taken at the start of the
//! request, so a concurrent publish can never make a single response mix
//! catalog versions.

mod health;
mod models;
mod refresh;

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::StatusCode;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Build the service router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/models", get(models::list_models))
        .route("/models/{id}", get(models::get_model))
        .route("/families", get(models::list_families))
        .route("/health", get(health::health_check))
        .route("/refresh", post(refresh::trigger_refresh))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error body for non-2xx responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        });
        (self.status, Json(body)).into_response()
    }
}

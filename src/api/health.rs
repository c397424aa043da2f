use crate::api::envelope::{ApiResponse, HandlerResult};
use crate::AppState;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub environment: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> HandlerResult<HealthStatus> {
    Ok(ApiResponse::ok(HealthStatus {
        status: "ok",
        environment: state.config.environment.clone(),
    }))
}

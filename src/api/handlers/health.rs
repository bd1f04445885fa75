use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// The cohort table loads before the server starts, so a serving process
/// is a healthy one.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "cohorts": state.cohorts.len(),
    }))
}

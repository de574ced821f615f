use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the snapshot store answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let sessions = state.orchestrator.list_sessions().await?;
    Ok(Json(serde_json::json!({
        "status": "ready",
        "sessions": sessions.len(),
        "live": state.orchestrator.live_count().await,
    })))
}

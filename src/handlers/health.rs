use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;
use crate::state::AppState;

// health handler - reports which store is wired, not whether it answers
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "store": state.store_name,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

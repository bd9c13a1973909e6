use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use std::sync::Arc;

use crate::models::{ErrorCode, ErrorResponse, UpdatedAtResponse, json_response};
use crate::state::AppState;

// GET /api/blog/updated-at/{*entry_id}
pub async fn updated_at_handler(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
) -> Response {
    // a cold cache reads the file, keep that off the async workers
    let loader = state.updated_at.clone();
    let id = entry_id.clone();
    let lookup = tokio::task::spawn_blocking(move || loader.blog_updated_at(&id)).await;

    match lookup {
        Ok(Some(updated_at)) => json_response(
            StatusCode::OK,
            &UpdatedAtResponse { entry_id, updated_at },
        ),
        Ok(None) => json_response(
            StatusCode::NOT_FOUND,
            &ErrorResponse { error: ErrorCode::NotFound },
        ),
        Err(err) => {
            tracing::error!(error = %err, "updated-at lookup task failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorResponse { error: ErrorCode::ServerError },
            )
        }
    }
}

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

// Successful /api/visits body
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitsResponse {
    pub total: u64,
}

// Fixed vocabulary for error bodies
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ServerError,
    RateLimited,
    Forbidden,
    NotFound,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorCode,
}

// Blog updated-at lookup body
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedAtResponse {
    pub entry_id: String,
    pub updated_at: String,
}

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON response that is never cached by browsers or the edge.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"server_error"}"#.to_vec(),
            )
        }
    };

    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        bytes,
    )
        .into_response()
}

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;

use crate::counter::{increment_total, read_total};
use crate::error::ApiError;
use crate::metrics::{INCREMENTS, REJECTIONS, REQUEST_LATENCY, REQUEST_TOTAL, STORE_ERRORS};
use crate::models::{VisitsResponse, json_response};
use crate::origin::is_same_origin;
use crate::rate_limit::{RateDecision, check_and_mark, client_identifier};
use crate::state::AppState;
use crate::store::CounterStore;

fn require_store(state: &AppState) -> Result<&dyn CounterStore, ApiError> {
    state.store.as_deref().ok_or(ApiError::StoreUnavailable)
}

fn finish(result: Result<u64, ApiError>, start_time: Instant) -> Response {
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(total) => json_response(StatusCode::OK, &VisitsResponse { total }),
        Err(err) => {
            match &err {
                ApiError::Forbidden => REJECTIONS.with_label_values(&["forbidden"]).inc(),
                ApiError::RateLimited => REJECTIONS.with_label_values(&["rate_limited"]).inc(),
                ApiError::StoreUnavailable | ApiError::Store(_) => STORE_ERRORS.inc(),
            }
            err.into_response()
        }
    }
}

// GET /api/visits - current total, never increments
pub async fn get_visits(State(state): State<Arc<AppState>>) -> Response {
    REQUEST_TOTAL.with_label_values(&["GET"]).inc();
    let start_time = Instant::now();

    let result = current_total(&state).await;
    finish(result, start_time)
}

async fn current_total(state: &AppState) -> Result<u64, ApiError> {
    let store = require_store(state)?;
    Ok(read_total(store).await?)
}

// POST /api/visits - origin check, rate limit, then increment
pub async fn post_visits(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    REQUEST_TOTAL.with_label_values(&["POST"]).inc();
    let start_time = Instant::now();

    let result = record_visit(&state, &uri, &headers).await;
    if let Ok(total) = result {
        INCREMENTS.inc();
        tracing::debug!(total, "visit recorded");
    }

    finish(result, start_time)
}

async fn record_visit(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Result<u64, ApiError> {
    if !is_same_origin(headers, uri, state.public_origin.as_deref()) {
        return Err(ApiError::Forbidden);
    }

    // no identifier, no increment
    let identifier =
        client_identifier(headers, &state.client_ip_header).ok_or(ApiError::RateLimited)?;

    let store = require_store(state)?;

    if check_and_mark(store, &identifier, state.rate_window).await? == RateDecision::Limited {
        return Err(ApiError::RateLimited);
    }

    Ok(increment_total(store).await?)
}

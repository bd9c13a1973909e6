use axum::http::HeaderMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::time::Duration;

use crate::error::StoreError;
use crate::store::{CounterStore, RATE_LIMIT_PREFIX};

// Same characters encodeURIComponent leaves alone
const IDENTIFIER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited,
}

/// Reads the client identifier from the trusted proxy header.
pub fn client_identifier(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn marker_key(identifier: &str) -> String {
    format!("{RATE_LIMIT_PREFIX}{}", utf8_percent_encode(identifier, IDENTIFIER))
}

/// Limits an identifier to one increment per window.
///
/// An existing marker means limited. Otherwise the marker is written before
/// returning, so a failed increment afterwards still consumes the window.
pub async fn check_and_mark(
    store: &dyn CounterStore,
    identifier: &str,
    window: Duration,
) -> Result<RateDecision, StoreError> {
    let key = marker_key(identifier);

    if store.get(&key).await?.is_some() {
        return Ok(RateDecision::Limited);
    }

    store.put(&key, "1", Some(window)).await?;
    Ok(RateDecision::Allowed)
}

use axum::http::{HeaderMap, Uri, header};
use url::{Origin, Url};

fn parse_origin(raw: &str) -> Option<Origin> {
    let origin = Url::parse(raw.trim()).ok()?.origin();
    // opaque origins ("null", data:, file:) never match anything
    origin.is_tuple().then_some(origin)
}

/// Origin the request was addressed to.
///
/// A configured public origin wins. Otherwise an absolute request URI is
/// used, then the `Host` header with the scheme from `X-Forwarded-Proto`.
pub fn request_origin(
    headers: &HeaderMap,
    uri: &Uri,
    public_origin: Option<&str>,
) -> Option<Origin> {
    if let Some(configured) = public_origin {
        return parse_origin(configured);
    }

    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return parse_origin(&format!("{scheme}://{authority}"));
    }

    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");

    parse_origin(&format!("{scheme}://{host}"))
}

/// Origin claimed by the caller: `Origin`, else the origin of `Referer`.
pub fn caller_origin(headers: &HeaderMap) -> Option<Origin> {
    let raw = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))?
        .to_str()
        .ok()?;
    parse_origin(raw)
}

/// Absent or unparseable origins count as a mismatch.
pub fn is_same_origin(headers: &HeaderMap, uri: &Uri, public_origin: Option<&str>) -> bool {
    match (caller_origin(headers), request_origin(headers, uri, public_origin)) {
        (Some(caller), Some(own)) => caller == own,
        _ => false,
    }
}

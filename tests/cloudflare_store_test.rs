use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;

use visit_counter::config::CloudflareSettings;
use visit_counter::counter::{increment_total, read_total};
use visit_counter::error::StoreError;
use visit_counter::rate_limit::{RateDecision, check_and_mark};
use visit_counter::store::{CloudflareKvStore, CounterStore, VISITS_KEY};

// Stand-in for the Workers KV REST API
#[derive(Default)]
struct FakeKv {
    values: Mutex<HashMap<String, String>>,
    ttls: Mutex<HashMap<String, u64>>,
    fail: Mutex<bool>,
}

type Shared = Arc<FakeKv>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-token")
}

async fn get_value(
    State(kv): State<Shared>,
    Path((_account, _ns, key)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, String::new());
    }
    if *kv.fail.lock().unwrap() {
        return (StatusCode::SERVICE_UNAVAILABLE, String::new());
    }
    match kv.values.lock().unwrap().get(&key) {
        Some(value) => (StatusCode::OK, value.clone()),
        None => (StatusCode::NOT_FOUND, r#"{"success":false}"#.to_string()),
    }
}

async fn put_value(
    State(kv): State<Shared>,
    Path((_account, _ns, key)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if let Some(ttl) = query.get("expiration_ttl").and_then(|t| t.parse().ok()) {
        kv.ttls.lock().unwrap().insert(key.clone(), ttl);
    }
    kv.values.lock().unwrap().insert(key, body);
    StatusCode::OK
}

async fn spawn_fake_kv() -> (String, Shared) {
    let kv = Shared::default();
    let app = Router::new()
        .route(
            "/client/v4/accounts/{account}/storage/kv/namespaces/{ns}/values/{key}",
            get(get_value).put(put_value),
        )
        .with_state(kv.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/client/v4"), kv)
}

fn store_for(base: &str, token: &str) -> CloudflareKvStore {
    CloudflareKvStore::new(
        reqwest::Client::new(),
        &CloudflareSettings {
            api_base: base.to_string(),
            account_id: "acct".into(),
            namespace_id: "ns".into(),
            api_token: token.into(),
        },
    )
    .unwrap()
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let (base, _kv) = spawn_fake_kv().await;
    let store = store_for(&base, "test-token");

    assert_eq!(store.get(VISITS_KEY).await.unwrap(), None);
    assert_eq!(read_total(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn increments_through_rest_api() {
    let (base, kv) = spawn_fake_kv().await;
    kv.values.lock().unwrap().insert(VISITS_KEY.into(), "3".into());
    let store = store_for(&base, "test-token");

    assert_eq!(increment_total(&store).await.unwrap(), 4);
    assert_eq!(kv.values.lock().unwrap().get(VISITS_KEY).map(String::as_str), Some("4"));
    assert!(!kv.ttls.lock().unwrap().contains_key(VISITS_KEY));
}

#[tokio::test]
async fn markers_carry_expiration_ttl() {
    let (base, kv) = spawn_fake_kv().await;
    let store = store_for(&base, "test-token");

    let decision = check_and_mark(&store, "2001:db8::1", Duration::from_secs(60)).await.unwrap();
    assert_eq!(decision, RateDecision::Allowed);
    assert_eq!(
        kv.ttls.lock().unwrap().get("visits:ip:2001%3Adb8%3A%3A1").copied(),
        Some(60)
    );

    let decision = check_and_mark(&store, "2001:db8::1", Duration::from_secs(60)).await.unwrap();
    assert_eq!(decision, RateDecision::Limited);
}

#[tokio::test]
async fn error_status_surfaces_as_store_error() {
    let (base, kv) = spawn_fake_kv().await;
    *kv.fail.lock().unwrap() = true;
    let store = store_for(&base, "test-token");

    let err = store.get(VISITS_KEY).await.unwrap_err();
    assert!(matches!(err, StoreError::Status(503)), "{err:?}");
}

#[tokio::test]
async fn bad_token_is_rejected() {
    let (base, _kv) = spawn_fake_kv().await;
    let store = store_for(&base, "wrong");

    let err = store.put(VISITS_KEY, "1", None).await.unwrap_err();
    assert!(matches!(err, StoreError::Status(401)), "{err:?}");
}

#[tokio::test]
async fn unreachable_api_is_backend_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let store = store_for(&format!("http://{addr}/client/v4"), "test-token");

    let err = store.get(VISITS_KEY).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)), "{err:?}");
}

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use visit_counter::app;
use visit_counter::error::StoreError;
use visit_counter::state::AppState;
use visit_counter::store::{CounterStore, MemoryStore};
use visit_counter::updated_at::{UpdatedAtLoader, UpdatedAtSource};

pub const SITE_ORIGIN: &str = "https://example.com";

/// Memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    fail_put_key: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_get(&self, enabled: bool) {
        self.fail_get.store(enabled, Ordering::SeqCst);
    }

    pub fn set_fail_put(&self, enabled: bool) {
        self.fail_put.store(enabled, Ordering::SeqCst);
    }

    // only writes to this key fail
    pub fn set_fail_put_key(&self, key: &str) {
        *self.fail_put_key.lock().unwrap() = Some(key.to_string());
    }

    pub async fn seed(&self, key: &str, value: &str) {
        self.inner.put(key, value, None).await.unwrap();
    }

    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl CounterStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("get failed".into()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let key_fails = self.fail_put_key.lock().unwrap().as_deref() == Some(key);
        if key_fails || self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("put failed".into()));
        }
        self.inner.put(key, value, ttl).await
    }
}

pub struct StaticSource(pub &'static str);

impl UpdatedAtSource for StaticSource {
    fn read_json(&self) -> io::Result<String> {
        Ok(self.0.to_string())
    }
}

pub fn test_state(store: Option<Arc<dyn CounterStore>>) -> AppState {
    let source: Box<dyn UpdatedAtSource> = Box::new(StaticSource(
        r#"{"2024/hello-world.md":"2024-03-01T12:00:00+09:00","drafts/wip.md":null}"#,
    ));
    AppState {
        store,
        store_name: "memory",
        client_ip_header: "cf-connecting-ip".into(),
        public_origin: Some(SITE_ORIGIN.into()),
        rate_window: Duration::from_secs(60),
        updated_at: Arc::new(UpdatedAtLoader::new(source)),
    }
}

pub fn test_router(store: Arc<FlakyStore>) -> Router {
    app(test_state(Some(store as Arc<dyn CounterStore>)))
}

/// Send a request and return status, headers and JSON body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

pub async fn get_visits(app: &Router) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri("/api/visits")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, req).await;
    (status, body)
}

/// POST /api/visits with the given headers.
pub async fn post_visits(app: &Router, headers: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/visits")
        .header(header::ACCEPT, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (status, _, body) = send(app, builder.body(Body::empty()).unwrap()).await;
    (status, body)
}

/// Same-origin POST from the given client IP.
pub async fn post_from(app: &Router, ip: &str) -> (StatusCode, Value) {
    post_visits(app, &[("cf-connecting-ip", ip), ("origin", SITE_ORIGIN)]).await
}

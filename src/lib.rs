use axum::{Router, routing::get};
use std::sync::Arc;

pub mod config;
pub mod counter;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod origin;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod updated_at;

use crate::config::{Args, StoreSettings};
use crate::state::AppState;
use crate::store::{CloudflareKvStore, CounterStore, MemoryStore};
use crate::updated_at::{FileSource, UpdatedAtLoader, UpdatedAtSource, default_updated_at_path};

// Store chosen at startup, memory keeps its concrete type for the sweeper
pub enum BuiltStore {
    Memory(Arc<MemoryStore>),
    Cloudflare(Arc<CloudflareKvStore>),
    Unconfigured,
}

impl BuiltStore {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Cloudflare(_) => "cloudflare",
            Self::Unconfigured => "unconfigured",
        }
    }

    pub fn as_counter_store(&self) -> Option<Arc<dyn CounterStore>> {
        match self {
            Self::Memory(store) => Some(store.clone() as Arc<dyn CounterStore>),
            Self::Cloudflare(store) => Some(store.clone() as Arc<dyn CounterStore>),
            Self::Unconfigured => None,
        }
    }
}

/// A broken store config degrades to "no store" so requests answer 500.
pub fn build_store(settings: &StoreSettings, client: reqwest::Client) -> BuiltStore {
    match settings {
        StoreSettings::Memory => BuiltStore::Memory(Arc::new(MemoryStore::new())),
        StoreSettings::Cloudflare(cf) => match CloudflareKvStore::new(client, cf) {
            Ok(store) => BuiltStore::Cloudflare(Arc::new(store)),
            Err(err) => {
                tracing::warn!(error = %err, "cloudflare store disabled");
                BuiltStore::Unconfigured
            }
        },
        StoreSettings::Unconfigured => BuiltStore::Unconfigured,
    }
}

pub fn build_state(args: &Args, store: &BuiltStore) -> AppState {
    let updated_at_path = args.updated_at_file.clone().unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_default();
        default_updated_at_path(&cwd, |p| p.exists())
    });
    let source: Box<dyn UpdatedAtSource> = Box::new(FileSource::new(updated_at_path));

    // read the file now so requests start from a warm cache
    let updated_at = Arc::new(UpdatedAtLoader::new(source));
    let entries = updated_at.map().len();
    tracing::info!(entries, "blog updated-at map loaded");

    AppState {
        store: store.as_counter_store(),
        store_name: store.name(),
        client_ip_header: args.client_ip_header.clone(),
        public_origin: args.public_origin.clone(),
        rate_window: args.rate_window(),
        updated_at,
    }
}

// router with all routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/api/visits",
            get(handlers::get_visits).post(handlers::post_visits),
        )
        .route("/api/blog/updated-at/{*entry_id}", get(handlers::updated_at_handler))
        .with_state(Arc::new(state))
}

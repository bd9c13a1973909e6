use std::sync::Arc;
use std::time::Duration;
use crate::store::CounterStore;
use crate::updated_at::{UpdatedAtLoader, UpdatedAtSource};

// app's shared state - nothing request-specific lives here

#[derive(Clone)]
pub struct AppState {
    pub store: Option<Arc<dyn CounterStore>>, // None = binding missing
    pub store_name: &'static str,
    pub client_ip_header: String,
    pub public_origin: Option<String>,
    pub rate_window: Duration, // how long a marker blocks a client
    pub updated_at: Arc<UpdatedAtLoader<Box<dyn UpdatedAtSource>>>,
}


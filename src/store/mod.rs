use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

mod cloudflare;
mod memory;

pub use cloudflare::CloudflareKvStore;
pub use memory::{MemoryStore, expiry_sweeper};

// Key holding the string-encoded total
pub const VISITS_KEY: &str = "site:total_visits";

// Prefix for per-client rate-limit markers
pub const RATE_LIMIT_PREFIX: &str = "visits:ip:";

/// Minimal get/put capability over a key-value store.
///
/// There is no atomic increment: callers that need one must read, modify
/// and write back, accepting last-writer-wins under concurrency.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`. With a `ttl` the key disappears on its own.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;
}

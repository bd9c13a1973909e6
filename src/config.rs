use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

// Shortest TTL Workers KV accepts
pub const MIN_RATE_WINDOW_SECS: u64 = 60;

// Which key-value backend holds the counter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Cloudflare,
    None,
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "visit-counter")]
#[command(about = "Visit counter API for a static site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "VISITS_PORT", default_value_t = 8080)]
    pub port: u16,

    // Counter store backend
    #[arg(long, env = "VISITS_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    #[arg(long, env = "CF_ACCOUNT_ID")]
    pub cf_account_id: Option<String>,

    #[arg(long, env = "CF_KV_NAMESPACE_ID")]
    pub cf_namespace_id: Option<String>,

    #[arg(long, env = "CF_API_TOKEN", hide_env_values = true)]
    pub cf_api_token: Option<String>,

    #[arg(
        long,
        env = "CF_API_BASE",
        default_value = "https://api.cloudflare.com/client/v4"
    )]
    pub cf_api_base: String,

    // Header the edge proxy fills with the connecting IP.
    // Only trust it when the proxy strips client-sent copies.
    #[arg(long, env = "VISITS_CLIENT_IP_HEADER", default_value = "cf-connecting-ip")]
    pub client_ip_header: String,

    // Origin the site is served from, e.g. "https://example.com"
    #[arg(long, env = "VISITS_PUBLIC_ORIGIN", value_parser = parse_public_origin)]
    pub public_origin: Option<String>,

    // Rate limit window in seconds
    #[arg(
        long,
        env = "VISITS_RATE_WINDOW",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(MIN_RATE_WINDOW_SECS..)
    )]
    pub rate_window: u64,

    // Expiry sweep interval for the memory store
    #[arg(long, env = "VISITS_SWEEP_INTERVAL", default_value_t = 30)]
    pub sweep_interval: u64,

    // Generated blog updated-at map
    #[arg(long, env = "VISITS_UPDATED_AT_FILE")]
    pub updated_at_file: Option<PathBuf>,

    // Verbose, human readable logs
    #[arg(long, env = "VISITS_DEV", default_value_t = false)]
    pub dev: bool,
}

// Cloudflare KV credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudflareSettings {
    pub api_base: String,
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Memory,
    Cloudflare(CloudflareSettings),
    Unconfigured,
}

/// Accepts a scheme://host[:port] origin and returns its serialized form.
pub fn parse_public_origin(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid origin {raw:?}: {e}"))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(format!("{raw:?} has no scheme and host, e.g. https://example.com"));
    }
    Ok(origin.ascii_serialization())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    /// Resolves the store choice. Missing Cloudflare credentials leave the
    /// service without a store rather than failing startup.
    pub fn store_settings(&self) -> StoreSettings {
        match self.store {
            StoreKind::Memory => StoreSettings::Memory,
            StoreKind::None => StoreSettings::Unconfigured,
            StoreKind::Cloudflare => {
                match (
                    non_empty(&self.cf_account_id),
                    non_empty(&self.cf_namespace_id),
                    non_empty(&self.cf_api_token),
                ) {
                    (Some(account_id), Some(namespace_id), Some(api_token)) => {
                        StoreSettings::Cloudflare(CloudflareSettings {
                            api_base: self.cf_api_base.trim_end_matches('/').to_string(),
                            account_id,
                            namespace_id,
                            api_token,
                        })
                    }
                    _ => {
                        tracing::warn!("cloudflare store selected but credentials are incomplete");
                        StoreSettings::Unconfigured
                    }
                }
            }
        }
    }
}

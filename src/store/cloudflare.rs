use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use super::CounterStore;
use crate::config::CloudflareSettings;
use crate::error::StoreError;

/// Workers KV namespace reached through the Cloudflare REST API.
pub struct CloudflareKvStore {
    client: reqwest::Client,
    namespace_url: Url,
    api_token: String,
}

impl CloudflareKvStore {
    pub fn new(
        client: reqwest::Client,
        settings: &CloudflareSettings,
    ) -> Result<Self, StoreError> {
        let mut namespace_url = Url::parse(&settings.api_base)
            .map_err(|e| StoreError::Backend(format!("invalid api base: {e}")))?;
        namespace_url
            .path_segments_mut()
            .map_err(|_| StoreError::Backend("api base cannot be a base url".into()))?
            .pop_if_empty()
            .extend([
                "accounts",
                settings.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                settings.namespace_id.as_str(),
                "values",
            ]);

        Ok(Self {
            client,
            namespace_url,
            api_token: settings.api_token.clone(),
        })
    }

    // Key goes in as one path segment, so "/" and ":" get escaped
    pub fn value_url(&self, key: &str) -> Url {
        let mut url = self.namespace_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(key);
        }
        url
    }
}

#[async_trait]
impl CounterStore for CloudflareKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let res = self
            .client
            .get(self.value_url(key))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(res.text().await?)),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut url = self.value_url(key);
        if let Some(ttl) = ttl {
            url.query_pairs_mut()
                .append_pair("expiration_ttl", &ttl.as_secs().to_string());
        }

        let res = self
            .client
            .put(url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .await?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Status(res.status().as_u16()))
        }
    }
}

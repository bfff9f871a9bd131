use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::errors::{SyncError, SyncResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Single-shot GET of the store listing. No retries.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storefeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &Url) -> SyncResult<Value> {
        log::info!("Fetching store list from {url}");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Got non-success response for {url}: {status}");
            return Err(SyncError::Fetch(format!("{url} returned {status}")));
        }

        let body = response.text().await?;
        let envelope = serde_json::from_str(&body)
            .map_err(|e| SyncError::Parse(format!("response from {url} is not JSON: {e}")))?;
        log::info!("Got response for {url} ({} bytes)", body.len());
        Ok(envelope)
    }
}

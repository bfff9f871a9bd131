use once_cell::sync::OnceCell;
use serde::Deserialize;
use url::Url;

use super::{auth, credentials::ServiceAccount};
use crate::{
    errors::{SyncError, SyncResult},
    feed::types::StatusUpdate,
    tasks::status_sync::types::StatusStore,
};

const USER_AGENT: &str = concat!("storefeed/", env!("CARGO_PKG_VERSION"));

/// Where store entries live: the database base URL plus the root path that
/// every record key is appended to.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseTarget {
    pub database_url: Url,
    pub root_path: String,
}

impl DatabaseTarget {
    pub fn new(database_url: Url, root_path: &str) -> Self {
        Self {
            database_url,
            root_path: root_path.trim_matches('/').to_string(),
        }
    }

    /// REST URL for `{root_path}/{key}.json`. The key is encoded as a single
    /// path segment.
    pub fn child_url(&self, key: &str) -> SyncResult<Url> {
        let mut url = self.database_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SyncError::config(format!(
                    "database URL '{}' cannot be used as a base",
                    self.database_url
                ))
            })?;
            segments.pop_if_empty();
            segments.extend(self.root_path.split('/').filter(|s| !s.is_empty()));
            segments.push(&format!("{key}.json"));
        }
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseErrorResponse {
    error: String,
}

/// Credentialed handle to a Firebase Realtime Database, talking to its REST
/// API.
pub struct RealtimeDatabase {
    client: reqwest::Client,
    account: ServiceAccount,
    target: DatabaseTarget,
    access_token: OnceCell<String>,
}

impl RealtimeDatabase {
    /// Validates the signing key up front so a bad credential fails here and
    /// not on the first write.
    pub fn new(account: ServiceAccount, target: DatabaseTarget) -> SyncResult<Self> {
        account.signing_key()?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SyncError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            account,
            target,
            access_token: OnceCell::new(),
        })
    }

    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    pub fn is_authorized(&self) -> bool {
        self.access_token.get().is_some()
    }

    /// Exchanges the service account for an access token. Only the first call
    /// hits the token endpoint.
    pub async fn authorize(&self) -> SyncResult<()> {
        if self.is_authorized() {
            log::debug!("Database handle already authorized");
            return Ok(());
        }
        let token = auth::fetch_access_token(&self.client, &self.account).await?;
        // First stored token wins.
        let _ = self.access_token.set(token);
        Ok(())
    }

    /// Partial-field merge (`PATCH`) of `update` into `{root_path}/{key}`.
    pub async fn update_child(&self, key: &str, update: &StatusUpdate) -> SyncResult<()> {
        let token = self
            .access_token
            .get()
            .ok_or_else(|| SyncError::record("database handle is not authorized"))?;
        let url = self.target.child_url(key)?;

        let response = self
            .client
            .patch(url)
            .bearer_auth(token)
            .json(update)
            .send()
            .await
            .map_err(|e| SyncError::record(format!("write to '{key}' failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<DatabaseErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(SyncError::record(format!(
                "write to '{key}' rejected with {status}: {reason}"
            )));
        }

        Ok(())
    }
}

impl StatusStore for RealtimeDatabase {
    async fn update_status(&self, key: &str, update: &StatusUpdate) -> SyncResult<()> {
        self.update_child(key, update).await
    }
}

use crate::{
    errors::{SyncError, SyncResult},
    feed::types::StatusUpdate,
};

/// Destination for per-store status merges.
#[allow(async_fn_in_trait)]
pub trait StatusStore {
    /// Merge `update` into the entry at `key`, leaving its other fields alone.
    async fn update_status(&self, key: &str, update: &StatusUpdate) -> SyncResult<()>;
}

/// Logs each merge instead of sending it.
pub struct DryRun;

impl StatusStore for DryRun {
    async fn update_status(&self, key: &str, update: &StatusUpdate) -> SyncResult<()> {
        let body = serde_json::to_string(update)
            .map_err(|e| SyncError::record(format!("cannot encode update for '{key}': {e}")))?;
        log::info!("[dry run] would update '{key}' with {body}");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: usize,
    pub skipped: usize,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.updated + self.skipped
    }
}

use serde_json::Value;

use super::types::{DryRun, StatusStore, SyncReport};
use crate::{
    config::SyncConfig,
    errors::{SyncError, SyncResult},
    feed::{
        envelope::classify,
        fetcher::FeedFetcher,
        types::{KeyFormat, StatusUpdate, StoreRecord},
    },
    firebase::{connector::Connector, credentials::ServiceAccount},
    observability,
};

/// One full sync run: connect, fetch, classify, upsert.
///
/// Connection, fetch and shape failures abort before any write. Failures on
/// individual entries are only counted.
pub async fn start(
    config: &SyncConfig,
    connector: &Connector,
    account: &ServiceAccount,
) -> SyncResult<SyncReport> {
    let fetcher = FeedFetcher::new(config.fetch_timeout)?;

    let report = if config.dry_run {
        connector.connect(account, &config.target)?;
        log::info!("Dry run: skipping authorization, no writes will be sent");
        sync(&fetcher, config, &DryRun).await?
    } else {
        let database = connector.initialize(account, &config.target).await?;
        sync(&fetcher, config, database).await?
    };

    observability::log_sync_summary(&report);
    Ok(report)
}

pub async fn sync<S: StatusStore>(
    fetcher: &FeedFetcher,
    config: &SyncConfig,
    store: &S,
) -> SyncResult<SyncReport> {
    let envelope = fetcher.fetch(&config.feed_url).await?;
    let shape = classify(envelope)?;
    log::info!("Feed is {} shaped with {} entries", shape.name(), shape.len());

    log::info!("Updating store status under /{}", config.target.root_path);
    Ok(upsert_all(store, shape.into_records(), config.key_format).await)
}

/// Writes each entry in feed order. Never fails as a whole.
pub async fn upsert_all<S: StatusStore>(
    store: &S,
    entries: Vec<Value>,
    key_format: KeyFormat,
) -> SyncReport {
    let mut report = SyncReport::default();

    for entry in entries {
        let (key, update) = match prepare(entry, key_format) {
            Ok(prepared) => prepared,
            Err(e) => {
                log::warn!("Skipping entry: {e}");
                report.skipped += 1;
                continue;
            }
        };

        match store.update_status(&key, &update).await {
            Ok(()) => {
                log::info!(
                    "Updated status for '{key}' (is_open: {})",
                    display_field(update.is_open.as_ref())
                );
                report.updated += 1;
            }
            Err(e) => {
                log::warn!("Failed to update status for '{key}': {e}");
                report.skipped += 1;
            }
        }
    }

    report
}

fn prepare(entry: Value, key_format: KeyFormat) -> SyncResult<(String, StatusUpdate)> {
    let record = StoreRecord::from_value(entry)?;
    let key = record.storage_key(key_format)?;
    let update = record.status_update();
    if update.is_empty() {
        return Err(SyncError::record(format!(
            "'{key}' has neither is_open nor close_status"
        )));
    }
    Ok((key, update))
}

fn display_field(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "absent".to_string(),
    }
}

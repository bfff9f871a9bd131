use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
};

use serde_json::{Map, Value};

use crate::{
    errors::{SyncError, SyncResult},
    feed::types::StatusUpdate,
    tasks::status_sync::types::StatusStore,
};

/// Service account with a throwaway RSA key, shared with the integration tests.
pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../tests/fixtures/service_account.json");

/// In-memory stand-in for the Realtime Database with the same merge rules:
/// named fields are replaced, `null` deletes a field, everything else stays.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Map<String, Value>>>,
    writes: RefCell<Vec<(String, Value)>>,
    failing_keys: HashSet<String>,
}

impl MemoryStore {
    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            failing_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn seed(&self, key: &str, value: Value) {
        if let Value::Object(fields) = value {
            self.entries.borrow_mut().insert(key.to_string(), fields);
        }
    }

    pub fn entry(&self, key: &str) -> Option<Value> {
        self.entries
            .borrow()
            .get(key)
            .map(|fields| Value::Object(fields.clone()))
    }

    /// Successful writes, in order, as `(key, body)`.
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes.borrow().clone()
    }
}

impl StatusStore for MemoryStore {
    async fn update_status(&self, key: &str, update: &StatusUpdate) -> SyncResult<()> {
        if self.failing_keys.contains(key) {
            return Err(SyncError::record(format!("write to '{key}' rejected")));
        }

        let body = serde_json::to_value(update).map_err(|e| SyncError::record(e.to_string()))?;
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key.to_string()).or_default();
        if let Value::Object(fields) = &body {
            for (field, value) in fields {
                if value.is_null() {
                    entry.remove(field);
                } else {
                    entry.insert(field.clone(), value.clone());
                }
            }
        }
        self.writes.borrow_mut().push((key.to_string(), body));
        Ok(())
    }
}

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{SyncError, SyncResult};

pub const TITLE: &str = "title";
pub const VIEW_UID: &str = "view_uid";
pub const IS_OPEN: &str = "is_open";
pub const CLOSE_STATUS: &str = "close_status";

/// Characters the Realtime Database refuses in keys, plus `/` which would
/// address a nested path.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// How a store's database key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFormat {
    /// Bare `view_uid`.
    #[default]
    Uid,
    /// `"{title} - {view_uid}"`, the older convention.
    TitleUid,
}

impl FromStr for KeyFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uid" | "view_uid" => Ok(KeyFormat::Uid),
            "title-uid" | "title_uid" => Ok(KeyFormat::TitleUid),
            other => Err(SyncError::config(format!(
                "unknown key format '{other}' (expected 'uid' or 'title-uid')"
            ))),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::Uid => write!(f, "uid"),
            KeyFormat::TitleUid => write!(f, "title-uid"),
        }
    }
}

/// One store entry as published by the feed. Kept as the raw JSON object so
/// that an absent field and an explicit `null` stay distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord(Map<String, Value>);

impl StoreRecord {
    /// Accepts any JSON object carrying both `title` and `view_uid` keys,
    /// whatever their values.
    pub fn from_value(value: Value) -> SyncResult<Self> {
        match value {
            Value::Object(fields) => {
                if fields.contains_key(TITLE) && fields.contains_key(VIEW_UID) {
                    Ok(StoreRecord(fields))
                } else {
                    Err(SyncError::record(format!(
                        "entry is missing '{TITLE}' or '{VIEW_UID}': {}",
                        Value::Object(fields)
                    )))
                }
            }
            other => Err(SyncError::record(format!("entry is not an object: {other}"))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn storage_key(&self, format: KeyFormat) -> SyncResult<String> {
        let uid = self.key_component(VIEW_UID)?;
        let key = match format {
            KeyFormat::Uid => uid,
            KeyFormat::TitleUid => format!("{} - {uid}", self.key_component(TITLE)?),
        };
        validate_key(&key)?;
        Ok(key)
    }

    pub fn status_update(&self) -> StatusUpdate {
        StatusUpdate {
            is_open: self.get(IS_OPEN).cloned(),
            close_status: self.get(CLOSE_STATUS).cloned(),
        }
    }

    fn key_component(&self, field: &str) -> SyncResult<String> {
        match self.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(SyncError::record(format!(
                "'{field}' cannot be used in a key: {other}"
            ))),
            None => Err(SyncError::record(format!("'{field}' is missing"))),
        }
    }
}

fn validate_key(key: &str) -> SyncResult<()> {
    if key.trim().is_empty() {
        return Err(SyncError::record("storage key is empty"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_ascii_control())
    {
        return Err(SyncError::record(format!(
            "storage key '{key}' contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

/// Partial-field merge payload. `None` leaves the field out of the write
/// entirely; `Some(Value::Null)` writes an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_status: Option<Value>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_open.is_none() && self.close_status.is_none()
    }
}

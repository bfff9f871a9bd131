use serde_json::Value;

use super::types::{TITLE, VIEW_UID};
use crate::errors::{SyncError, SyncResult};

const DATA: &str = "data";

/// The recognized layouts of the feed response. Each variant carries the
/// extracted entries, in feed order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedShape {
    /// `[ ... ]`
    List(Vec<Value>),
    /// `{"data": {"data": [ ... ]}}`
    Paginated(Vec<Value>),
    /// `{"data": [ ... ]}`
    Wrapped(Vec<Value>),
    /// `{"title": ..., "view_uid": ..., ...}`
    Single(Value),
}

impl FeedShape {
    pub fn name(&self) -> &'static str {
        match self {
            FeedShape::List(_) => "list",
            FeedShape::Paginated(_) => "paginated",
            FeedShape::Wrapped(_) => "wrapped",
            FeedShape::Single(_) => "single",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeedShape::List(entries)
            | FeedShape::Paginated(entries)
            | FeedShape::Wrapped(entries) => entries.len(),
            FeedShape::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            FeedShape::List(entries)
            | FeedShape::Paginated(entries)
            | FeedShape::Wrapped(entries) => entries,
            FeedShape::Single(entry) => vec![entry],
        }
    }
}

/// Classifies the envelope, first match wins:
/// bare list, `data.data` list, `data` list, then a lone store object.
/// Anything else is a `Shape` error.
pub fn classify(envelope: Value) -> SyncResult<FeedShape> {
    let mut fields = match envelope {
        Value::Array(entries) => return Ok(FeedShape::List(entries)),
        Value::Object(fields) => fields,
        other => {
            return Err(SyncError::Shape(format!(
                "expected a list or an object, got {}",
                type_name(&other)
            )))
        }
    };

    if let Some(Value::Object(inner)) = fields.get_mut(DATA) {
        if let Some(Value::Array(entries)) = inner.get_mut(DATA) {
            return Ok(FeedShape::Paginated(std::mem::take(entries)));
        }
    }
    if let Some(Value::Array(entries)) = fields.get_mut(DATA) {
        return Ok(FeedShape::Wrapped(std::mem::take(entries)));
    }

    if fields.contains_key(TITLE) && fields.contains_key(VIEW_UID) {
        return Ok(FeedShape::Single(Value::Object(fields)));
    }

    let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    keys.sort_unstable();
    Err(SyncError::Shape(format!(
        "object with keys [{}] has no store list",
        keys.join(", ")
    )))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

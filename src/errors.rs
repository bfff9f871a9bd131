use thiserror::Error;

use crate::firebase::{auth::TokenError, credentials::CredentialError};

/// Failure kinds for a sync run.
///
/// Everything except `Record` is fatal and aborts the run before any write.
/// `Record` is recovered per store entry and counted as skipped.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unrecognized feed shape: {0}")]
    Shape(String),
    #[error("record error: {0}")]
    Record(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config(message.into())
    }

    pub fn record(message: impl Into<String>) -> Self {
        SyncError::Record(message.into())
    }
}

/// Transport-level failures become `Fetch`; the caller decides whether a
/// failure during a per-record write should be downgraded to `Record`.
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Fetch(format!("request timed out: {err}"))
        } else if err.is_connect() {
            SyncError::Fetch(format!("connection failed: {err}"))
        } else {
            SyncError::Fetch(err.to_string())
        }
    }
}

impl From<CredentialError> for SyncError {
    fn from(err: CredentialError) -> Self {
        SyncError::Config(err.to_string())
    }
}

impl From<TokenError> for SyncError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Http(e) => e.into(),
            other => SyncError::Config(other.to_string()),
        }
    }
}

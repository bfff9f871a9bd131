pub mod config;
pub mod errors;
pub mod feed;
pub mod firebase;
pub mod observability;
pub mod tasks;
#[cfg(test)]
pub mod test_helpers;

pub use errors::{SyncError, SyncResult};
pub use tasks::status_sync::types::SyncReport;

use once_cell::sync::OnceCell;

use super::{
    client::{DatabaseTarget, RealtimeDatabase},
    credentials::ServiceAccount,
};
use crate::errors::SyncResult;

/// Owns the single database handle for a run.
///
/// The handle is built lazily on the first `connect` and reused afterwards;
/// later calls ignore their arguments and hand back the existing handle.
#[derive(Default)]
pub struct Connector {
    database: OnceCell<RealtimeDatabase>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(
        &self,
        account: &ServiceAccount,
        target: &DatabaseTarget,
    ) -> SyncResult<&RealtimeDatabase> {
        if let Some(database) = self.database() {
            log::debug!(
                "Reusing existing database handle for {}",
                database.target().database_url
            );
            return Ok(database);
        }
        self.database.get_or_try_init(|| {
            let database = RealtimeDatabase::new(account.clone(), target.clone())?;
            log::info!(
                "Database handle created for {} as {}",
                target.database_url,
                account.client_email
            );
            Ok(database)
        })
    }

    /// `connect` followed by `authorize`. Any failure here is fatal for the run.
    pub async fn initialize(
        &self,
        account: &ServiceAccount,
        target: &DatabaseTarget,
    ) -> SyncResult<&RealtimeDatabase> {
        let database = self.connect(account, target)?;
        database.authorize().await?;
        log::info!("Connected to Firebase");
        Ok(database)
    }

    pub fn database(&self) -> Option<&RealtimeDatabase> {
        self.database.get()
    }
}

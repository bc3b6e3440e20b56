use async_trait::async_trait;

use crate::core::error::PersistenceError;
use crate::core::remote_store::RemoteStore;
use crate::core::store::{Store, PROGRESS_KEY};
use crate::progress::record::CompactRecord;

pub const DEFAULT_SLOT: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLoad {
    Fresh(CompactRecord),
    /// The remote could not be reached; this is the last copy seen.
    Stale(CompactRecord),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWrite {
    Committed,
    /// Someone else wrote the slot first; `version` identifies their copy.
    Conflict {
        version: String,
        server: CompactRecord,
    },
}

/// Storage the progress machine persists through. Local storage is the
/// durable copy; the remote side is best-effort.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    fn load_local(&self) -> Result<Option<CompactRecord>, PersistenceError>;
    fn save_local(&self, record: &CompactRecord) -> Result<(), PersistenceError>;
    fn is_remote_connected(&self) -> bool;
    async fn load_remote(&self, slot: u32) -> Result<RemoteLoad, PersistenceError>;
    async fn update_remote(
        &self,
        slot: u32,
        record: &CompactRecord,
    ) -> Result<RemoteWrite, PersistenceError>;
    async fn resolve_conflict(
        &self,
        slot: u32,
        version: &str,
        merged: &CompactRecord,
    ) -> Result<(), PersistenceError>;
}

/// SQLite for the local copy, plus an optional remote slot store.
pub struct StoreGateway {
    local: Store,
    remote: Option<RemoteStore>,
}

impl StoreGateway {
    pub fn new(local: Store, remote: Option<RemoteStore>) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &Store {
        &self.local
    }

    pub fn remote(&self) -> Option<&RemoteStore> {
        self.remote.as_ref()
    }

    fn connected_remote(&self) -> Result<&RemoteStore, PersistenceError> {
        self.remote
            .as_ref()
            .filter(|r| r.is_connected())
            .ok_or_else(|| PersistenceError::Remote("remote store not connected".to_string()))
    }
}

#[async_trait]
impl PersistenceGateway for StoreGateway {
    fn load_local(&self) -> Result<Option<CompactRecord>, PersistenceError> {
        self.local.load(PROGRESS_KEY)
    }

    fn save_local(&self, record: &CompactRecord) -> Result<(), PersistenceError> {
        self.local.save(PROGRESS_KEY, record)
    }

    fn is_remote_connected(&self) -> bool {
        self.remote.as_ref().is_some_and(RemoteStore::is_connected)
    }

    async fn load_remote(&self, slot: u32) -> Result<RemoteLoad, PersistenceError> {
        self.connected_remote()?.load(slot).await
    }

    async fn update_remote(
        &self,
        slot: u32,
        record: &CompactRecord,
    ) -> Result<RemoteWrite, PersistenceError> {
        self.connected_remote()?.update(slot, record).await
    }

    async fn resolve_conflict(
        &self,
        slot: u32,
        version: &str,
        merged: &CompactRecord,
    ) -> Result<(), PersistenceError> {
        self.connected_remote()?.resolve(slot, version, merged).await
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::PersistenceError;
use crate::core::time::now_utc;
use crate::progress::gateway::{RemoteLoad, RemoteWrite};
use crate::progress::record::CompactRecord;

#[derive(Serialize, Deserialize, Clone, Debug)]
struct SlotEntry {
    data: CompactRecord,
    version: String,
    updated_at: DateTime<Utc>,
}

type SlotTable = BTreeMap<u32, SlotEntry>;

#[derive(Clone)]
enum Backend {
    File(PathBuf),
    Memory(Arc<Mutex<SlotTable>>),
}

/// Slot-based remote progress store with optimistic versioning: a write is
/// rejected with a conflict when the slot changed since this client last
/// saw it. Several clients may share one backend to model several devices.
pub struct RemoteStore {
    backend: Backend,
    connected: AtomicBool,
    latency: Duration,
    known: Mutex<HashMap<u32, String>>,
    cache: Mutex<HashMap<u32, CompactRecord>>,
}

impl RemoteStore {
    pub fn file(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(path, b"{}\n")?;
        }
        Ok(Self::with_backend(Backend::File(path.to_path_buf())))
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory(Arc::new(Mutex::new(SlotTable::new()))))
    }

    /// A second client on the same backend, with its own version tracking.
    pub fn another_client(&self) -> Self {
        Self::with_backend(self.backend.clone())
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            connected: AtomicBool::new(true),
            latency: Duration::ZERO,
            known: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Delay applied before every remote operation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn load(&self, slot: u32) -> Result<RemoteLoad, PersistenceError> {
        self.delay().await;
        let table = match self.read_table() {
            Ok(table) => table,
            Err(err) => {
                return match self.cached(slot) {
                    Some(record) => {
                        tracing::warn!("remote store unreadable ({}), using cached copy", err);
                        Ok(RemoteLoad::Stale(record))
                    }
                    None => Err(err),
                }
            }
        };
        match table.get(&slot) {
            Some(entry) => {
                self.remember(slot, &entry.version, Some(&entry.data));
                Ok(RemoteLoad::Fresh(entry.data.clone()))
            }
            None => Ok(RemoteLoad::NotFound),
        }
    }

    pub async fn update(
        &self,
        slot: u32,
        record: &CompactRecord,
    ) -> Result<RemoteWrite, PersistenceError> {
        self.delay().await;
        let mut table = self.read_table()?;
        if let Some(current) = table.get(&slot) {
            let known = self.known_version(slot);
            if known.as_deref() != Some(current.version.as_str()) {
                self.remember_cache(slot, &current.data);
                return Ok(RemoteWrite::Conflict {
                    version: current.version.clone(),
                    server: current.data.clone(),
                });
            }
        }
        let version = self.put(&mut table, slot, record);
        self.write_table(&table)?;
        self.remember(slot, &version, Some(record));
        Ok(RemoteWrite::Committed)
    }

    /// Writes `merged` only if the slot is still at `version`.
    pub async fn resolve(
        &self,
        slot: u32,
        version: &str,
        merged: &CompactRecord,
    ) -> Result<(), PersistenceError> {
        self.delay().await;
        let mut table = self.read_table()?;
        let found = table
            .get(&slot)
            .map(|e| e.version.clone())
            .unwrap_or_default();
        if found != version {
            return Err(PersistenceError::Conflict {
                expected: version.to_string(),
                found,
            });
        }
        let new_version = self.put(&mut table, slot, merged);
        self.write_table(&table)?;
        self.remember(slot, &new_version, Some(merged));
        Ok(())
    }

    /// Raw read of a slot, bypassing version tracking.
    pub fn peek(&self, slot: u32) -> Result<Option<CompactRecord>, PersistenceError> {
        Ok(self.read_table()?.get(&slot).map(|e| e.data.clone()))
    }

    fn put(&self, table: &mut SlotTable, slot: u32, record: &CompactRecord) -> String {
        let version = record.version();
        table.insert(
            slot,
            SlotEntry {
                data: record.clone(),
                version: version.clone(),
                updated_at: now_utc(),
            },
        );
        version
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn known_version(&self, slot: u32) -> Option<String> {
        self.known.lock().ok()?.get(&slot).cloned()
    }

    fn cached(&self, slot: u32) -> Option<CompactRecord> {
        self.cache.lock().ok()?.get(&slot).cloned()
    }

    fn remember(&self, slot: u32, version: &str, record: Option<&CompactRecord>) {
        if let Ok(mut known) = self.known.lock() {
            known.insert(slot, version.to_string());
        }
        if let Some(record) = record {
            self.remember_cache(slot, record);
        }
    }

    fn remember_cache(&self, slot: u32, record: &CompactRecord) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(slot, record.clone());
        }
    }

    fn read_table(&self) -> Result<SlotTable, PersistenceError> {
        match &self.backend {
            Backend::File(path) => {
                let data = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&data)?)
            }
            Backend::Memory(table) => table
                .lock()
                .map(|t| t.clone())
                .map_err(|_| PersistenceError::Remote("slot table poisoned".to_string())),
        }
    }

    fn write_table(&self, table: &SlotTable) -> Result<(), PersistenceError> {
        match &self.backend {
            Backend::File(path) => {
                let json = serde_json::to_string_pretty(table)?;
                fs::write(path, json)?;
                Ok(())
            }
            Backend::Memory(shared) => {
                let mut guard = shared
                    .lock()
                    .map_err(|_| PersistenceError::Remote("slot table poisoned".to_string()))?;
                *guard = table.clone();
                Ok(())
            }
        }
    }
}

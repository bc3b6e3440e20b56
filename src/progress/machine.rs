use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::error::{PersistenceError, TrainerError};
use crate::core::types::PhishResult;
use crate::progress::gateway::{PersistenceGateway, RemoteLoad, RemoteWrite, DEFAULT_SLOT};
use crate::progress::record::{deserialize, serialize, CompactRecord};
use crate::progress::state::ProgressState;
use crate::progress::telemetry::{Achievement, Leaderboard, TelemetrySink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub slot: u32,
    /// Upper bound on the initial remote load; past it the local copy wins
    /// and reconciliation happens on the next save.
    pub remote_timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT,
            remote_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a background save: the merged state when a remote conflict
/// had to be resolved.
type SaveTask = JoinHandle<Option<ProgressState>>;

/// Owns the user's progress. All mutation goes through `&mut self`, so a
/// single owner serializes every read-modify-write; persistence runs on
/// background tasks chained in submission order.
pub struct ProgressMachine {
    state: ProgressState,
    phase: Phase,
    gateway: Arc<dyn PersistenceGateway>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    options: LoadOptions,
    pending: Option<SaveTask>,
}

impl ProgressMachine {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        telemetry: Option<Arc<dyn TelemetrySink>>,
        options: LoadOptions,
    ) -> Self {
        Self {
            state: ProgressState::default(),
            phase: Phase::Uninitialized,
            gateway,
            telemetry,
            options,
            pending: None,
        }
    }

    /// `new` followed by `load`.
    pub async fn open(
        gateway: Arc<dyn PersistenceGateway>,
        telemetry: Option<Arc<dyn TelemetrySink>>,
        options: LoadOptions,
    ) -> Self {
        let mut machine = Self::new(gateway, telemetry, options);
        machine.load().await;
        machine
    }

    /// Loads the local copy, then joins in the remote copy if one arrives
    /// within the timeout. Always ends in `Ready`.
    pub async fn load(&mut self) {
        self.phase = Phase::Loading;
        self.state = match self.gateway.load_local() {
            Ok(Some(record)) => deserialize(&record),
            Ok(None) => ProgressState::default(),
            Err(err) => {
                tracing::warn!("local progress unreadable: {}", err);
                ProgressState::default()
            }
        };

        if self.gateway.is_remote_connected() {
            let slot = self.options.slot;
            let remote =
                tokio::time::timeout(self.options.remote_timeout, self.gateway.load_remote(slot))
                    .await;
            match remote {
                Ok(Ok(RemoteLoad::Fresh(record))) => self.adopt_remote(&record, "fresh"),
                Ok(Ok(RemoteLoad::Stale(record))) => self.adopt_remote(&record, "stale"),
                Ok(Ok(RemoteLoad::NotFound)) => {
                    tracing::debug!("no remote progress in slot {}", slot);
                }
                Ok(Err(err)) => tracing::warn!("remote progress load failed: {}", err),
                Err(_) => tracing::warn!(
                    "remote progress load timed out after {:?}; continuing with local copy",
                    self.options.remote_timeout
                ),
            }
        }
        self.phase = Phase::Ready;
        tracing::info!(
            level = self.state.level,
            rounds = self.state.total_rounds(),
            "progress ready"
        );
    }

    fn adopt_remote(&mut self, record: &CompactRecord, kind: &str) {
        let remote = deserialize(record);
        let merged = self.state.merge(&remote);
        if merged != self.state {
            tracing::info!("merged {} remote progress", kind);
        }
        self.state = merged;
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn phase(&self) -> Phase {
        match &self.pending {
            Some(task) if self.phase == Phase::Ready && !task.is_finished() => Phase::Saving,
            _ => self.phase,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready)
    }

    fn ensure_ready(&self) -> Result<(), TrainerError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(TrainerError::NotReady)
        }
    }

    fn connected_telemetry(&self) -> Option<Arc<dyn TelemetrySink>> {
        self.telemetry.clone().filter(|t| t.is_connected())
    }

    pub async fn add_result(&mut self, result: PhishResult) -> Result<(), TrainerError> {
        self.ensure_ready()?;
        self.settle().await;
        self.state.record(result);

        match self.connected_telemetry() {
            Some(sink) => {
                if result == PhishResult::PhishDetected {
                    sink.submit_score(
                        Leaderboard::DetectedPhishingUrls,
                        self.state.count(result) as f64,
                    );
                    let steps = self.state.phish_behind.saturating_add(1);
                    for achievement in Achievement::STREAK {
                        sink.increment_achievement(achievement, steps);
                    }
                    self.state.phish_behind = 0;
                }
                if result.is_phish() {
                    sink.submit_score(Leaderboard::DetectionRate, self.state.detection_rate());
                }
            }
            None if result == PhishResult::PhishDetected => {
                self.state.phish_behind = self.state.phish_behind.saturating_add(1);
            }
            None => {}
        }

        self.save();
        Ok(())
    }

    /// Raises the level. Lower values leave the state untouched.
    pub async fn set_level(&mut self, level: u32) -> Result<(), TrainerError> {
        self.ensure_ready()?;
        self.settle().await;
        if self.state.raise_level(level) {
            self.save();
        }
        Ok(())
    }

    /// Marks the first start as done.
    pub async fn start_finished(&mut self) -> Result<(), TrainerError> {
        self.ensure_ready()?;
        self.settle().await;
        self.state.app_started = true;
        self.save();
        Ok(())
    }

    /// Forces a save of the current state, e.g. after connectivity returns.
    pub async fn sync(&mut self) -> Result<(), TrainerError> {
        self.ensure_ready()?;
        self.settle().await;
        self.save();
        self.flush().await;
        Ok(())
    }

    /// Waits for every queued save and folds in any merged remote state.
    pub async fn flush(&mut self) {
        if let Some(task) = self.pending.take() {
            self.finish(task).await;
        }
    }

    /// Folds in a finished save without waiting on a running one.
    async fn settle(&mut self) {
        if self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.pending.take() {
                self.finish(task).await;
            }
        }
    }

    async fn finish(&mut self, task: SaveTask) {
        match task.await {
            Ok(Some(merged)) => self.state = self.state.join_synced(&merged),
            Ok(None) => {}
            Err(err) => tracing::warn!("progress save task failed: {}", err),
        }
    }

    fn unlock_achievements(&self) {
        let Some(sink) = self.connected_telemetry() else {
            return;
        };
        if self.state.app_started {
            sink.unlock_achievement(Achievement::Welcome);
        }
        if self.state.level > 1 {
            sink.unlock_achievement(Achievement::SearchAndRescue);
        }
        if self.state.level > 2 {
            sink.unlock_achievement(Achievement::KnowYourPoison);
        }
    }

    fn save(&mut self) {
        self.unlock_achievements();
        let snapshot = self.state;
        let gateway = Arc::clone(&self.gateway);
        let slot = self.options.slot;
        let previous = self.pending.take();
        self.pending = Some(tokio::spawn(async move {
            let mut carried = None;
            if let Some(previous) = previous {
                match previous.await {
                    Ok(merged) => carried = merged,
                    Err(err) => tracing::warn!("previous save task failed: {}", err),
                }
            }
            let snapshot = match &carried {
                Some(merged) => snapshot.join_synced(merged),
                None => snapshot,
            };
            match persist(gateway.as_ref(), slot, snapshot).await {
                Ok(Some(merged)) => Some(merged),
                Ok(None) => carried,
                Err(err) => {
                    tracing::warn!("progress save failed, keeping in-memory state: {}", err);
                    carried
                }
            }
        }));
    }
}

/// Local first, then remote. A remote conflict is merged, written back to
/// the remote and only then stored locally; the merged state is returned.
async fn persist(
    gateway: &dyn PersistenceGateway,
    slot: u32,
    snapshot: ProgressState,
) -> Result<Option<ProgressState>, PersistenceError> {
    let record = serialize(&snapshot);
    gateway.save_local(&record)?;
    if !gateway.is_remote_connected() {
        return Ok(None);
    }
    match gateway.update_remote(slot, &record).await? {
        RemoteWrite::Committed => Ok(None),
        RemoteWrite::Conflict { version, server } => {
            let merged = snapshot.join_synced(&deserialize(&server));
            let merged_record = serialize(&merged);
            gateway.resolve_conflict(slot, &version, &merged_record).await?;
            gateway.save_local(&merged_record)?;
            tracing::info!("resolved remote progress conflict in slot {}", slot);
            Ok(Some(merged))
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leaderboard {
    DetectedPhishingUrls,
    DetectionRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    Welcome,
    SearchAndRescue,
    KnowYourPoison,
    Plankton,
    Anchovy,
    Trout,
    Tuna,
    WhaleShark,
}

impl Achievement {
    /// Incremental achievements fed by detected phish.
    pub const STREAK: [Achievement; 5] = [
        Achievement::Plankton,
        Achievement::Anchovy,
        Achievement::Trout,
        Achievement::Tuna,
        Achievement::WhaleShark,
    ];
}

/// Optional leaderboard/achievement service. Unlocking an already unlocked
/// achievement must be a no-op on the implementation side.
pub trait TelemetrySink: Send + Sync {
    fn is_connected(&self) -> bool;
    fn submit_score(&self, board: Leaderboard, score: f64);
    fn increment_achievement(&self, achievement: Achievement, steps: u32);
    fn unlock_achievement(&self, achievement: Achievement);
}

/// Writes telemetry events to the log.
#[derive(Debug, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn is_connected(&self) -> bool {
        true
    }

    fn submit_score(&self, board: Leaderboard, score: f64) {
        tracing::info!(?board, score, "leaderboard score");
    }

    fn increment_achievement(&self, achievement: Achievement, steps: u32) {
        tracing::info!(?achievement, steps, "achievement progress");
    }

    fn unlock_achievement(&self, achievement: Achievement) {
        tracing::debug!(?achievement, "achievement unlocked");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Score(Leaderboard, f64),
    Increment(Achievement, u32),
    Unlock(Achievement),
}

/// Keeps every event in memory; connectivity can be toggled.
#[derive(Debug)]
pub struct RecordingTelemetry {
    connected: AtomicBool,
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn submit_score(&self, board: Leaderboard, score: f64) {
        self.push(TelemetryEvent::Score(board, score));
    }

    fn increment_achievement(&self, achievement: Achievement, steps: u32) {
        self.push(TelemetryEvent::Increment(achievement, steps));
    }

    fn unlock_achievement(&self, achievement: Achievement) {
        self.push(TelemetryEvent::Unlock(achievement));
    }
}

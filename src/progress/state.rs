use serde::Serialize;

use crate::core::types::PhishResult;

pub const RESULT_SLOTS: usize = PhishResult::ALL.len();

/// Persistent training progress. Every field only ever grows (apart from
/// `phish_behind`, which drains into achievements), so two copies can always
/// be reconciled with a field-wise join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressState {
    pub level: u32,
    pub results: [u64; RESULT_SLOTS],
    pub app_started: bool,
    /// Phish detections made while no telemetry sink was connected.
    pub phish_behind: u32,
}

impl ProgressState {
    pub fn count(&self, result: PhishResult) -> u64 {
        self.results[result.index()]
    }

    pub fn record(&mut self, result: PhishResult) {
        let slot = &mut self.results[result.index()];
        *slot = slot.saturating_add(1);
    }

    /// Raises the level; lower values are ignored.
    pub fn raise_level(&mut self, level: u32) -> bool {
        if level > self.level {
            self.level = level;
            true
        } else {
            false
        }
    }

    pub fn total_rounds(&self) -> u64 {
        self.results.iter().sum()
    }

    /// Share of phishing URLs the user caught, in `[0, 1]`. Zero before any
    /// phishing URL has been shown.
    pub fn detection_rate(&self) -> f64 {
        let detected = self.count(PhishResult::PhishDetected);
        let total = detected + self.count(PhishResult::PhishNotDetected);
        if total == 0 {
            return 0.0;
        }
        detected as f64 / total as f64
    }

    /// Field-wise join: max of every counter, OR of every flag.
    pub fn merge(&self, other: &ProgressState) -> ProgressState {
        let mut results = [0u64; RESULT_SLOTS];
        for (slot, (a, b)) in results
            .iter_mut()
            .zip(self.results.iter().zip(other.results.iter()))
        {
            *slot = (*a).max(*b);
        }
        ProgressState {
            level: self.level.max(other.level),
            results,
            app_started: self.app_started || other.app_started,
            phish_behind: self.phish_behind.max(other.phish_behind),
        }
    }

    /// Joins the monotone fields of `other` but keeps this side's
    /// `phish_behind`. Used for state flowing back from this device's own
    /// saves, whose streak may already have been drained here.
    pub fn join_synced(&self, other: &ProgressState) -> ProgressState {
        ProgressState {
            phish_behind: self.phish_behind,
            ..self.merge(other)
        }
    }
}

pub fn merge(local: &ProgressState, remote: &ProgressState) -> ProgressState {
    local.merge(remote)
}

#[cfg(test)]
pub(crate) fn arb_state() -> impl proptest::strategy::Strategy<Value = ProgressState> {
    use proptest::prelude::*;

    (
        0u32..20,
        prop::array::uniform4(0u64..1_000),
        any::<bool>(),
        0u32..50,
    )
        .prop_map(|(level, results, app_started, phish_behind)| ProgressState {
            level,
            results,
            app_started,
            phish_behind,
        })
}

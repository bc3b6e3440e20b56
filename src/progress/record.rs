use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::hash::sha256_hex;
use crate::core::types::PhishResult;
use crate::progress::state::ProgressState;

pub const LEVEL: &str = "level";
pub const APP_STARTED: &str = "appStarted";
pub const PHISH_BEHIND: &str = "phishBehindStreak";
pub const VALUE_PREFIX: &str = "value_";

/// Serialized progress as exchanged with storage: a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactRecord(String);

impl CompactRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Content hash, used as the optimistic-concurrency version of a slot.
    pub fn version(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }
}

impl fmt::Display for CompactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn value_key(result: PhishResult) -> String {
    format!("{}{}", VALUE_PREFIX, result.record_name())
}

/// Keys come out sorted, so equal states always serialize identically.
pub fn serialize(state: &ProgressState) -> CompactRecord {
    let mut map = Map::new();
    map.insert(LEVEL.to_string(), Value::from(state.level));
    map.insert(APP_STARTED.to_string(), Value::from(state.app_started));
    map.insert(PHISH_BEHIND.to_string(), Value::from(state.phish_behind));
    for result in PhishResult::ALL {
        map.insert(value_key(result), Value::from(state.count(result)));
    }
    CompactRecord(Value::Object(map).to_string())
}

/// Never fails: anything that is not a JSON object yields the default state,
/// and each missing or mistyped field falls back to its default.
pub fn deserialize(record: &CompactRecord) -> ProgressState {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(record.as_str()) else {
        tracing::debug!("progress record unreadable, using defaults");
        return ProgressState::default();
    };
    let uint = |key: &str| map.get(key).and_then(Value::as_u64);
    let small = |key: &str| uint(key).and_then(|v| u32::try_from(v).ok()).unwrap_or(0);

    let mut state = ProgressState {
        level: small(LEVEL),
        app_started: map.get(APP_STARTED).and_then(Value::as_bool).unwrap_or(false),
        phish_behind: small(PHISH_BEHIND),
        ..Default::default()
    };
    for result in PhishResult::ALL {
        state.results[result.index()] = uint(&value_key(result)).unwrap_or(0);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::state::arb_state;
    use proptest::prelude::*;

    #[test]
    fn record_uses_flat_tagged_fields() {
        let mut state = ProgressState {
            level: 2,
            app_started: true,
            phish_behind: 4,
            ..Default::default()
        };
        state.record(PhishResult::PhishDetected);
        let record = serialize(&state);
        let value: Value = serde_json::from_str(record.as_str()).unwrap();
        assert_eq!(value["level"], 2);
        assert_eq!(value["appStarted"], true);
        assert_eq!(value["phishBehindStreak"], 4);
        assert_eq!(value["value_Phish_Detected"], 1);
        assert_eq!(value["value_Genuine_Flagged"], 0);
        assert_eq!(deserialize(&record), state);
    }

    #[test]
    fn garbage_degrades_to_defaults() {
        for text in ["", "{", "[]", "null", "42", "\u{0}"] {
            assert_eq!(deserialize(&CompactRecord::new(text)), ProgressState::default());
        }
    }

    #[test]
    fn missing_fields_default_individually() {
        let record = CompactRecord::new(r#"{"level": 3, "value_Phish_Detected": "x", "extra": 1}"#);
        let state = deserialize(&record);
        assert_eq!(state.level, 3);
        assert_eq!(state.count(PhishResult::PhishDetected), 0);
        assert!(!state.app_started);
    }

    #[test]
    fn serialization_is_canonical() {
        let a = serialize(&ProgressState::default());
        let b = serialize(&deserialize(&a));
        assert_eq!(a, b);
        assert_eq!(a.version(), b.version());
    }

    proptest! {
        #[test]
        fn any_state_survives_the_record(state in arb_state()) {
            prop_assert_eq!(deserialize(&serialize(&state)), state);
        }
    }
}

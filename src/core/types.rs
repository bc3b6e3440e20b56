use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attacks::AttackType;
use crate::core::url::{join, UrlParts};

/// Outcome of one round on the {is phish} x {user said phish} matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhishResult {
    PhishDetected,
    PhishNotDetected,
    GenuineTrusted,
    GenuineFlagged,
}

impl PhishResult {
    pub const ALL: [PhishResult; 4] = [
        PhishResult::PhishDetected,
        PhishResult::PhishNotDetected,
        PhishResult::GenuineTrusted,
        PhishResult::GenuineFlagged,
    ];

    pub fn from_judgement(is_phish: bool, said_phish: bool) -> Self {
        match (is_phish, said_phish) {
            (true, true) => PhishResult::PhishDetected,
            (true, false) => PhishResult::PhishNotDetected,
            (false, false) => PhishResult::GenuineTrusted,
            (false, true) => PhishResult::GenuineFlagged,
        }
    }

    /// Stable slot used for counter storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in the persisted record (`value_<name>`).
    pub fn record_name(self) -> &'static str {
        match self {
            PhishResult::PhishDetected => "Phish_Detected",
            PhishResult::PhishNotDetected => "Phish_NotDetected",
            PhishResult::GenuineTrusted => "Genuine_Trusted",
            PhishResult::GenuineFlagged => "Genuine_Flagged",
        }
    }

    pub fn is_phish(self) -> bool {
        matches!(self, PhishResult::PhishDetected | PhishResult::PhishNotDetected)
    }

    pub fn is_correct(self) -> bool {
        matches!(self, PhishResult::PhishDetected | PhishResult::GenuineTrusted)
    }
}

impl fmt::Display for PhishResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhishResult::PhishDetected => write!(f, "phish caught"),
            PhishResult::PhishNotDetected => write!(f, "phish missed"),
            PhishResult::GenuineTrusted => write!(f, "genuine, trusted"),
            PhishResult::GenuineFlagged => write!(f, "genuine, wrongly flagged"),
        }
    }
}

/// What the presentation layer gets to show. Deliberately carries no
/// ground truth: `attack_type` is the lesson tag of the current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPayload {
    pub parts: Vec<String>,
    pub attack_type: AttackType,
}

/// One presentation of a URL and the user's judgement of it.
#[derive(Debug, Clone, Serialize)]
pub struct Round {
    pub source_url: String,
    pub lesson: AttackType,
    pub attack: Option<AttackType>,
    pub shown: UrlParts,
    pub verdict: Option<PhishResult>,
    pub part_choice: Option<usize>,
}

impl Round {
    pub fn is_phish(&self) -> bool {
        self.attack.is_some()
    }

    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.attack
            .map(AttackType::attack_indices)
            .unwrap_or_default()
    }

    pub fn shown_url(&self) -> String {
        join(&self.shown)
    }

    pub fn payload(&self) -> DisplayPayload {
        DisplayPayload {
            parts: self.shown.to_vec(),
            attack_type: self.lesson,
        }
    }

    /// Levenshtein distance between the genuine and the displayed URL.
    pub fn edit_distance(&self) -> usize {
        strsim::levenshtein(&self.source_url, &self.shown_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judgement_matrix_is_exhaustive_and_distinct() {
        let mut seen = Vec::new();
        for is_phish in [true, false] {
            for said in [true, false] {
                let r = PhishResult::from_judgement(is_phish, said);
                assert_eq!(r.is_phish(), is_phish);
                assert_eq!(r.is_correct(), is_phish == said);
                assert!(!seen.contains(&r));
                seen.push(r);
            }
        }
        assert_eq!(seen.len(), PhishResult::ALL.len());
    }

    #[test]
    fn indices_are_stable() {
        for (i, r) in PhishResult::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
    }
}

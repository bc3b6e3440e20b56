use serde::Deserialize;

use crate::attacks::dice::Dice;
use crate::attacks::AttackType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Each level drills one attack; past the curriculum, attacks are mixed.
    #[default]
    Level,
    Random,
    Sequential,
}

/// Attack taught by each level, starting at level 1. Level 0 is treated as 1.
const CURRICULUM: [AttackType; 4] = [
    AttackType::Typo,
    AttackType::Homoglyph,
    AttackType::SubdomainSpoof,
    AttackType::TldSwap,
];

pub fn curriculum_attack(level: u32) -> Option<AttackType> {
    let idx = level.max(1) as usize - 1;
    CURRICULUM.get(idx).copied()
}

#[derive(Debug, Clone)]
pub struct AttackSelector {
    mode: SelectionMode,
    cursor: usize,
}

impl AttackSelector {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode, cursor: 0 }
    }

    pub fn pick(&mut self, level: u32, dice: &mut dyn Dice) -> AttackType {
        match self.mode {
            SelectionMode::Level => curriculum_attack(level)
                .unwrap_or_else(|| AttackType::ALL[dice.roll(AttackType::ALL.len())]),
            SelectionMode::Random => AttackType::ALL[dice.roll(AttackType::ALL.len())],
            SelectionMode::Sequential => {
                let attack = AttackType::ALL[self.cursor % AttackType::ALL.len()];
                self.cursor = self.cursor.wrapping_add(1);
                attack
            }
        }
    }
}

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::TrainerError;
use crate::core::url::{UrlPart, UrlParts};

pub mod dice;
pub mod homoglyph;
pub mod selector;
pub mod subdomain;
pub mod tld;
pub mod typo;

use dice::Dice;

/// The perturbations a round can apply to a genuine URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackType {
    Typo,
    Homoglyph,
    SubdomainSpoof,
    TldSwap,
}

impl AttackType {
    pub const ALL: [AttackType; 4] = [
        AttackType::Typo,
        AttackType::Homoglyph,
        AttackType::SubdomainSpoof,
        AttackType::TldSwap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttackType::Typo => "typo",
            AttackType::Homoglyph => "homoglyph",
            AttackType::SubdomainSpoof => "subdomain-spoof",
            AttackType::TldSwap => "tld-swap",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }

    /// One-line hint shown after the user has judged a round.
    pub fn lesson(self) -> &'static str {
        match self {
            AttackType::Typo => "Letters in the domain were swapped or doubled.",
            AttackType::Homoglyph => "A letter in the domain was replaced by a look-alike.",
            AttackType::SubdomainSpoof => {
                "The real domain was pushed into a subdomain of someone else's domain."
            }
            AttackType::TldSwap => "The ending of the domain (the TLD) was changed.",
        }
    }

    pub fn attack_indices(self) -> BTreeSet<usize> {
        let parts: &[UrlPart] = match self {
            AttackType::Typo | AttackType::Homoglyph => &[UrlPart::Domain],
            AttackType::SubdomainSpoof => &[UrlPart::Subdomain, UrlPart::Domain, UrlPart::Tld],
            AttackType::TldSwap => &[UrlPart::Tld],
        };
        parts.iter().map(|p| p.index()).collect()
    }

    pub fn is_correct_part(self, selected: usize) -> bool {
        self.attack_indices().contains(&selected)
    }

    /// Produces the perturbed copy. The input is never modified.
    pub fn apply(self, parts: &UrlParts, dice: &mut dyn Dice) -> Result<UrlParts, TrainerError> {
        match self {
            AttackType::Typo => typo::apply(parts, dice),
            AttackType::Homoglyph => homoglyph::apply(parts, dice),
            AttackType::SubdomainSpoof => subdomain::apply(parts, dice),
            AttackType::TldSwap => tld::apply(parts, dice),
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn not_applicable(attack: AttackType, reason: impl Into<String>) -> TrainerError {
    TrainerError::AttackNotApplicable {
        attack: attack.name(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::dice::RngDice;
    use crate::core::url::{split, PART_COUNT};

    #[test]
    fn correct_part_matches_attack_indices() {
        for attack in AttackType::ALL {
            let indices = attack.attack_indices();
            for i in 0..PART_COUNT {
                assert_eq!(attack.is_correct_part(i), indices.contains(&i));
            }
        }
    }

    #[test]
    fn every_attack_changes_only_its_parts() {
        let original = split("https://www.example.com/login?x=1").unwrap();
        let mut dice = RngDice::seeded(42);
        for attack in AttackType::ALL {
            for _ in 0..20 {
                let perturbed = attack.apply(&original, &mut dice).unwrap();
                assert_ne!(perturbed, original, "{attack} left url unchanged");
                let indices = attack.attack_indices();
                for i in 0..PART_COUNT {
                    if !indices.contains(&i) {
                        assert_eq!(perturbed.get_index(i), original.get_index(i));
                    }
                }
            }
        }
    }

    #[test]
    fn names_round_trip() {
        for attack in AttackType::ALL {
            assert_eq!(AttackType::from_name(attack.name()), Some(attack));
        }
        assert_eq!(AttackType::from_name(" TYPO "), Some(AttackType::Typo));
        assert_eq!(AttackType::from_name("idn"), None);
    }
}

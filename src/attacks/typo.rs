use crate::attacks::dice::Dice;
use crate::attacks::{not_applicable, AttackType};
use crate::core::error::TrainerError;
use crate::core::url::{UrlPart, UrlParts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypoEdit {
    /// Swap the characters at `offset` and `offset + 1`.
    Swap,
    /// Insert a second copy of the character at `offset`.
    Duplicate,
}

pub fn apply(parts: &UrlParts, dice: &mut dyn Dice) -> Result<UrlParts, TrainerError> {
    let len = parts.domain().chars().count();
    if len < 2 {
        return Err(not_applicable(
            AttackType::Typo,
            format!("domain '{}' is shorter than 2 characters", parts.domain()),
        ));
    }
    let offset = dice.roll(len - 1);
    let edit = match dice.roll(2) {
        0 => TypoEdit::Swap,
        _ => TypoEdit::Duplicate,
    };
    let domain = typo_domain(parts.domain(), offset, edit)?;
    Ok(parts.with_part(UrlPart::Domain, domain))
}

/// Applies a single typo edit. A swap of two identical characters would be
/// invisible, so it degrades to a duplication at the same offset.
pub fn typo_domain(domain: &str, offset: usize, edit: TypoEdit) -> Result<String, TrainerError> {
    let mut chars: Vec<char> = domain.chars().collect();
    if chars.len() < 2 || offset + 1 >= chars.len() {
        return Err(not_applicable(
            AttackType::Typo,
            format!("offset {} out of range for '{}'", offset, domain),
        ));
    }
    match edit {
        TypoEdit::Swap if chars[offset] != chars[offset + 1] => chars.swap(offset, offset + 1),
        _ => {
            let c = chars[offset];
            chars.insert(offset, c);
        }
    }
    Ok(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::dice::{RngDice, ScriptedDice};
    use crate::core::url::split;

    #[test]
    fn seeded_swap_and_duplicate() {
        let parts = split("https://www.example.com/").unwrap();

        let mut dice = ScriptedDice::new([2, 0]);
        let swapped = apply(&parts, &mut dice).unwrap();
        assert_eq!(swapped.domain(), "exmaple");

        let mut dice = ScriptedDice::new([2, 1]);
        let doubled = apply(&parts, &mut dice).unwrap();
        assert_eq!(doubled.domain(), "exaample");
        assert_eq!(doubled.to_string(), "https://www.exaample.com/");
        assert_eq!(parts.domain(), "example");
    }

    #[test]
    fn two_char_domain_is_supported() {
        let parts = split("https://ab.io").unwrap();
        let mut dice = ScriptedDice::new([5, 0]);
        assert_eq!(apply(&parts, &mut dice).unwrap().domain(), "ba");
    }

    #[test]
    fn single_char_domain_is_rejected() {
        let parts = split("https://x.com").unwrap();
        let mut dice = ScriptedDice::default();
        assert!(matches!(
            apply(&parts, &mut dice),
            Err(TrainerError::AttackNotApplicable { attack: "typo", .. })
        ));
    }

    #[test]
    fn identical_neighbours_fall_back_to_duplicate() {
        assert_eq!(typo_domain("google", 1, TypoEdit::Swap).unwrap(), "gooogle");
    }

    #[test]
    fn non_ascii_domains_edit_whole_characters() {
        assert_eq!(typo_domain("bücher", 0, TypoEdit::Swap).unwrap(), "übcher");
        assert_eq!(typo_domain("bücher", 1, TypoEdit::Duplicate).unwrap(), "büücher");
    }

    #[test]
    fn random_edits_differ_by_one_swap_or_duplication() {
        let parts = split("https://example.com").unwrap();
        let candidates: Vec<String> = (0..6)
            .flat_map(|p| {
                [TypoEdit::Swap, TypoEdit::Duplicate]
                    .into_iter()
                    .map(move |edit| typo_domain("example", p, edit).unwrap())
            })
            .collect();
        let mut dice = RngDice::seeded(1);
        for _ in 0..200 {
            let out = apply(&parts, &mut dice).unwrap();
            assert!(
                candidates.iter().any(|c| c == out.domain()),
                "unexpected typo {}",
                out.domain()
            );
        }
    }
}

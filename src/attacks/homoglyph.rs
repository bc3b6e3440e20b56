use crate::attacks::dice::Dice;
use crate::attacks::{not_applicable, AttackType};
use crate::core::error::TrainerError;
use crate::core::url::{UrlPart, UrlParts};

const LOOKALIKES: &[(char, &str)] = &[
    ('o', "0"),
    ('l', "1"),
    ('i', "l"),
    ('e', "3"),
    ('s', "5"),
    ('m', "rn"),
    ('w', "vv"),
    ('d', "cl"),
];

fn lookalike(c: char) -> Option<&'static str> {
    let lower = c.to_ascii_lowercase();
    LOOKALIKES
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| *to)
}

pub fn apply(parts: &UrlParts, dice: &mut dyn Dice) -> Result<UrlParts, TrainerError> {
    let chars: Vec<char> = parts.domain().chars().collect();
    let candidates: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| lookalike(**c).is_some())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return Err(not_applicable(
            AttackType::Homoglyph,
            format!("no look-alike characters in '{}'", parts.domain()),
        ));
    }
    let pos = candidates[dice.roll(candidates.len())];
    Ok(parts.with_part(UrlPart::Domain, replace_at(&chars, pos)))
}

fn replace_at(chars: &[char], pos: usize) -> String {
    let mut out = String::with_capacity(chars.len() + 1);
    for (i, c) in chars.iter().enumerate() {
        match lookalike(*c) {
            Some(sub) if i == pos => {
                if c.is_ascii_uppercase() {
                    out.push_str(&sub.to_ascii_uppercase());
                } else {
                    out.push_str(sub);
                }
            }
            _ => out.push(*c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::dice::ScriptedDice;
    use crate::core::url::split;

    #[test]
    fn replaces_the_chosen_candidate() {
        let parts = split("https://www.google.com").unwrap();
        // candidates: o(1), o(2), l(4), e(5)
        let mut dice = ScriptedDice::new([2]);
        assert_eq!(apply(&parts, &mut dice).unwrap().domain(), "goog1e");
        let mut dice = ScriptedDice::new([0]);
        assert_eq!(apply(&parts, &mut dice).unwrap().domain(), "g0ogle");
    }

    #[test]
    fn multi_char_lookalikes() {
        let parts = split("https://amazon.com").unwrap();
        let mut dice = ScriptedDice::new([0]);
        assert_eq!(apply(&parts, &mut dice).unwrap().domain(), "arnazon");
    }

    #[test]
    fn no_candidates_is_not_applicable() {
        let parts = split("https://xyz.com").unwrap();
        let mut dice = ScriptedDice::default();
        assert!(matches!(
            apply(&parts, &mut dice),
            Err(TrainerError::AttackNotApplicable { attack: "homoglyph", .. })
        ));
    }
}

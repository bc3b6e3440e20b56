use crate::attacks::dice::Dice;
use crate::attacks::{not_applicable, AttackType};
use crate::core::error::TrainerError;
use crate::core::url::{split_port, UrlPart, UrlParts};

const SWAP_POOL: &[&str] = &[
    ".com", ".net", ".org", ".info", ".co", ".biz", ".io", ".xyz",
];

pub fn apply(parts: &UrlParts, dice: &mut dyn Dice) -> Result<UrlParts, TrainerError> {
    let (tld, port) = split_port(parts.get(UrlPart::Tld));
    let choices: Vec<&str> = SWAP_POOL
        .iter()
        .copied()
        .filter(|candidate| !candidate.eq_ignore_ascii_case(tld))
        .collect();
    if choices.is_empty() {
        return Err(not_applicable(AttackType::TldSwap, "no alternative tld"));
    }
    let swapped = choices[dice.roll(choices.len())];
    Ok(parts.with_part(UrlPart::Tld, format!("{swapped}{port}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::dice::ScriptedDice;
    use crate::core::url::split;

    #[test]
    fn never_picks_the_current_tld() {
        let parts = split("https://example.com/").unwrap();
        for roll in 0..SWAP_POOL.len() {
            let mut dice = ScriptedDice::new([roll]);
            let out = apply(&parts, &mut dice).unwrap();
            assert_ne!(out.get(UrlPart::Tld), ".com");
        }
    }

    #[test]
    fn compound_suffix_and_port() {
        let parts = split("https://example.co.uk:8080/a").unwrap();
        let mut dice = ScriptedDice::new([0]);
        assert_eq!(apply(&parts, &mut dice).unwrap().to_string(), "https://example.com:8080/a");
    }
}

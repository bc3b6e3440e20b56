use crate::attacks::dice::Dice;
use crate::attacks::{not_applicable, AttackType};
use crate::core::error::TrainerError;
use crate::core::url::{split_port, UrlPart, UrlParts};

/// Registrable domains the genuine host gets hung under.
const CARRIERS: &[(&str, &str)] = &[
    ("account-verify", ".net"),
    ("secure-login", ".com"),
    ("id-confirm", ".info"),
    ("signin-support", ".org"),
    ("auth-update", ".co"),
];

pub fn apply(parts: &UrlParts, dice: &mut dyn Dice) -> Result<UrlParts, TrainerError> {
    let (tld, port) = split_port(parts.get(UrlPart::Tld));
    let genuine = format!("{}{}", parts.domain(), tld);
    let choices: Vec<&(&str, &str)> = CARRIERS
        .iter()
        .filter(|(domain, suffix)| !genuine.eq_ignore_ascii_case(&format!("{domain}{suffix}")))
        .collect();
    if choices.is_empty() {
        return Err(not_applicable(
            AttackType::SubdomainSpoof,
            format!("'{}' is already a carrier domain", genuine),
        ));
    }
    let (carrier, carrier_tld) = choices[dice.roll(choices.len())];
    let subdomain = format!("{}{}.", parts.get(UrlPart::Subdomain), genuine);
    Ok(parts
        .with_part(UrlPart::Subdomain, subdomain)
        .with_part(UrlPart::Domain, *carrier)
        .with_part(UrlPart::Tld, format!("{carrier_tld}{port}")))
}

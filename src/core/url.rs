use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::TrainerError;

pub const PART_COUNT: usize = 7;

/// Fixed semantic slots of a training URL, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UrlPart {
    Scheme,
    Www,
    Subdomain,
    Domain,
    Tld,
    Path,
    Query,
}

impl UrlPart {
    pub const ALL: [UrlPart; PART_COUNT] = [
        UrlPart::Scheme,
        UrlPart::Www,
        UrlPart::Subdomain,
        UrlPart::Domain,
        UrlPart::Tld,
        UrlPart::Path,
        UrlPart::Query,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            UrlPart::Scheme => "scheme",
            UrlPart::Www => "www",
            UrlPart::Subdomain => "subdomain",
            UrlPart::Domain => "domain",
            UrlPart::Tld => "tld",
            UrlPart::Path => "path",
            UrlPart::Query => "query",
        }
    }
}

/// A URL broken at the boundaries the attacks work on. Concatenating the
/// parts in order always yields the URL they were split from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    parts: [String; PART_COUNT],
}

impl UrlParts {
    pub fn get(&self, part: UrlPart) -> &str {
        &self.parts[part.index()]
    }

    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    pub fn domain(&self) -> &str {
        self.get(UrlPart::Domain)
    }

    pub fn len(&self) -> usize {
        PART_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.parts.to_vec()
    }

    /// Returns a copy with one slot replaced.
    pub fn with_part(&self, part: UrlPart, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.parts[part.index()] = value.into();
        next
    }
}

impl fmt::Display for UrlParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(self))
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*://)(?P<www>(?i:www\.))?(?P<sub>(?:[^./?#:@\s]+\.)*?)(?P<domain>[^./?#:@\s]+)(?P<tld>\.(?:(?i:co|com|org|ac|gov)\.[A-Za-z]{2}|[^./?#:@\s]+)(?::[0-9]+)?)(?P<path>/[^?#]*)?(?P<query>[?#].*)?$",
        )
        .expect("url pattern is valid")
    })
}

pub fn split(raw: &str) -> Result<UrlParts, TrainerError> {
    let caps = url_pattern()
        .captures(raw)
        .ok_or_else(|| TrainerError::MalformedUrl(raw.to_string()))?;
    let group = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    Ok(UrlParts {
        parts: [
            group("scheme"),
            group("www"),
            group("sub"),
            group("domain"),
            group("tld"),
            group("path"),
            group("query"),
        ],
    })
}

pub fn join(parts: &UrlParts) -> String {
    parts.parts.concat()
}

/// Splits the `.com:8443` style tld slot into label and port suffix.
pub fn split_port(tld: &str) -> (&str, &str) {
    match tld.find(':') {
        Some(pos) => tld.split_at(pos),
        None => (tld, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_semantic_slots() {
        let parts = split("https://www.mail.example.com/login?next=%2F#top").unwrap();
        assert_eq!(parts.get(UrlPart::Scheme), "https://");
        assert_eq!(parts.get(UrlPart::Www), "www.");
        assert_eq!(parts.get(UrlPart::Subdomain), "mail.");
        assert_eq!(parts.get(UrlPart::Domain), "example");
        assert_eq!(parts.get(UrlPart::Tld), ".com");
        assert_eq!(parts.get(UrlPart::Path), "/login");
        assert_eq!(parts.get(UrlPart::Query), "?next=%2F#top");
    }

    #[test]
    fn keeps_two_label_suffix_together() {
        let parts = split("http://shop.example.co.uk").unwrap();
        assert_eq!(parts.domain(), "example");
        assert_eq!(parts.get(UrlPart::Tld), ".co.uk");
        assert_eq!(parts.get(UrlPart::Subdomain), "shop.");
    }

    #[test]
    fn port_stays_in_tld_slot() {
        let parts = split("https://example.org:8443/a").unwrap();
        assert_eq!(parts.get(UrlPart::Tld), ".org:8443");
        assert_eq!(split_port(parts.get(UrlPart::Tld)), (".org", ":8443"));
    }

    #[test]
    fn join_inverts_split() {
        for raw in [
            "https://example.com",
            "http://www.example.com/",
            "https://a.b.c.example.net/x/y?z=1",
            "https://WWW.Example.COM/Path#frag",
            "ftp://files.example.com.au:21/pub",
        ] {
            assert_eq!(join(&split(raw).unwrap()), raw);
        }
    }

    #[test]
    fn rejects_malformed() {
        for raw in [
            "example.com",
            "https://localhost/",
            "https://user@example.com",
            "https:///path",
            "",
        ] {
            assert!(
                matches!(split(raw), Err(TrainerError::MalformedUrl(_))),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn with_part_leaves_original_untouched() {
        let parts = split("https://example.com").unwrap();
        let changed = parts.with_part(UrlPart::Domain, "exarnple");
        assert_eq!(parts.domain(), "example");
        assert_eq!(changed.to_string(), "https://exarnple.com");
    }
}

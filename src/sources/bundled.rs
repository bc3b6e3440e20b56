use std::collections::VecDeque;
use std::{fs, path::Path};

use async_trait::async_trait;

use crate::attacks::dice::Dice;
use crate::core::error::TrainerError;
use crate::sources::{SourceKind, UrlSource};

pub const DEFAULT_URLS: &[&str] = &[
    "https://www.google.com/",
    "https://www.paypal.com/signin",
    "https://www.amazon.com/gp/css/order-history",
    "https://accounts.google.com/ServiceLogin",
    "https://www.facebook.com/login.php",
    "https://login.microsoftonline.com/",
    "https://www.dropbox.com/login",
    "https://github.com/login",
    "https://www.linkedin.com/login",
    "https://www.ebay.com/signin/",
    "https://www.wikipedia.org/",
    "https://www.apple.com/shop/bag",
    "https://secure.netflix.com/login",
    "https://www.bankofamerica.com/",
    "https://online.citi.com/US/login.do",
    "https://www.bbc.co.uk/news",
];

/// An in-memory list of URLs. Non-cycling lists are exhausted after one pass.
#[derive(Debug, Clone, Default)]
pub struct BundledList {
    urls: VecDeque<String>,
    cycling: bool,
}

impl BundledList {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls: urls.into(),
            cycling: false,
        }
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_URLS.iter().map(|u| u.to_string()).collect())
    }

    /// One URL per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self, TrainerError> {
        let data = fs::read_to_string(path)?;
        Ok(Self::new(parse_lines(&data)))
    }

    pub fn cycling(mut self) -> Self {
        self.cycling = true;
        self
    }

    /// Fisher-Yates shuffle driven by the given dice.
    pub fn shuffled(mut self, dice: &mut dyn Dice) -> Self {
        let urls = self.urls.make_contiguous();
        for i in (1..urls.len()).rev() {
            let j = dice.roll(i + 1);
            urls.swap(i, j);
        }
        self
    }

    pub fn urls(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

pub(crate) fn parse_lines(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl UrlSource for BundledList {
    fn kind(&self) -> SourceKind {
        SourceKind::Bundled
    }

    async fn next_candidate_url(&mut self) -> Option<String> {
        let url = self.urls.pop_front()?;
        if self.cycling {
            self.urls.push_back(url.clone());
        }
        Some(url)
    }
}

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::error::TrainerError;
use crate::sources::bundled::parse_lines;
use crate::sources::rate_limiter::RateLimiter;
use crate::sources::{SourceKind, UrlSource};

/// Pulls candidate URLs from an HTTP phish-list feed. The feed is either
/// plain text (one URL per line) or a JSON array of strings or of objects
/// carrying a `url` field.
pub struct RemoteList {
    client: Client,
    feed_url: String,
    buffer: VecDeque<String>,
    limiter: RateLimiter,
}

impl RemoteList {
    pub fn new(client: Client, feed_url: impl Into<String>, refetch_interval: Duration) -> Self {
        Self {
            client,
            feed_url: feed_url.into(),
            buffer: VecDeque::new(),
            limiter: RateLimiter::new(refetch_interval),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<String>, TrainerError> {
        let resp = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.text().await?;
        Ok(parse_feed(&body))
    }
}

pub fn parse_feed(body: &str) -> Vec<String> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('[') {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) else {
            return Vec::new();
        };
        return items
            .iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url.clone()),
                Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect();
    }
    parse_lines(body)
}

#[async_trait]
impl UrlSource for RemoteList {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn next_candidate_url(&mut self) -> Option<String> {
        if self.buffer.is_empty() && self.limiter.allow() {
            match self.fetch().await {
                Ok(urls) => {
                    tracing::info!("fetched {} urls from {}", urls.len(), self.feed_url);
                    self.buffer.extend(urls);
                }
                Err(err) => tracing::warn!("phish list {} unavailable: {}", self.feed_url, err),
            }
        }
        self.buffer.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_and_text_feeds() {
        assert_eq!(
            parse_feed(r#"[{"url":"https://a.com","id":1},"https://b.com",3]"#),
            vec!["https://a.com", "https://b.com"]
        );
        assert_eq!(parse_feed("https://a.com\nhttps://b.com\n"), vec!["https://a.com", "https://b.com"]);
        assert!(parse_feed("[not json").is_empty());
    }
}

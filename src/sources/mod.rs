use async_trait::async_trait;

pub mod bundled;
pub mod rate_limiter;
pub mod remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Bundled,
    Remote,
    Fallback,
}

/// Supplies genuine URLs to build rounds from.
#[async_trait]
pub trait UrlSource: Send {
    fn kind(&self) -> SourceKind;

    /// Next candidate, or `None` once the source is exhausted or unreachable.
    async fn next_candidate_url(&mut self) -> Option<String>;
}

/// Serves from `primary` and switches to `fallback` whenever it runs dry.
pub struct FallbackSource {
    primary: Box<dyn UrlSource>,
    fallback: Box<dyn UrlSource>,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn UrlSource>, fallback: Box<dyn UrlSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl UrlSource for FallbackSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Fallback
    }

    async fn next_candidate_url(&mut self) -> Option<String> {
        if let Some(url) = self.primary.next_candidate_url().await {
            return Some(url);
        }
        tracing::debug!("{:?} source dry, using fallback", self.primary.kind());
        self.fallback.next_candidate_url().await
    }
}

#[cfg(test)]
mod tests {
    use super::bundled::BundledList;
    use super::*;

    #[tokio::test]
    async fn fallback_takes_over_when_primary_is_dry() {
        let mut source = FallbackSource::new(
            Box::new(BundledList::new(vec!["https://a.example.com".to_string()])),
            Box::new(BundledList::new(vec!["https://b.example.com".to_string()])),
        );
        assert_eq!(
            source.next_candidate_url().await.as_deref(),
            Some("https://a.example.com")
        );
        assert_eq!(
            source.next_candidate_url().await.as_deref(),
            Some("https://b.example.com")
        );
        assert_eq!(source.next_candidate_url().await, None);
    }
}

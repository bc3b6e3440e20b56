use std::time::{Duration, Instant};

/// Allows at most one event per `min_interval`.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last: None,
            min_interval,
        }
    }

    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_inside_interval_is_refused() {
        let mut limiter = RateLimiter::new(Duration::from_secs(60));
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn zero_interval_always_allows() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.allow());
        assert!(limiter.allow());
    }
}

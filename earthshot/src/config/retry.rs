//! Retry, backoff and transfer-concurrency configuration.

use std::time::Duration;

/// Backoff after the catalog signals overload (HTTP 503). The upstream is
/// rate limited per account; hammering it sooner extends the ban.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(3600);

/// Pause between failed attempts that only need a fresh candidate.
pub const DEFAULT_REDRAW_DELAY: Duration = Duration::from_secs(1);

/// Per-request timeout for catalog and preview requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout for archive/band downloads, in seconds.
pub const DEFAULT_ARCHIVE_TIMEOUT_SECS: u64 = 600;

/// Maximum concurrent band/tile transfers within one cycle.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 15;

/// Configuration for the outer retry loop and transfer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// How long to wait after a rate-limit response before any new query.
    pub rate_limit_backoff: Duration,
    /// Delay before redrawing after a non-rate-limit failure.
    pub redraw_delay: Duration,
    /// Timeout for catalog/preview requests (seconds).
    pub request_timeout_secs: u64,
    /// Timeout for large archive downloads (seconds).
    pub archive_timeout_secs: u64,
    /// Bounded worker-pool size for parallel transfers.
    pub parallel_downloads: usize,
    /// Attempt cap for `run_until_success`; `None` retries indefinitely.
    pub max_attempts: Option<u32>,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    pub fn with_redraw_delay(mut self, delay: Duration) -> Self {
        self.redraw_delay = delay;
        self
    }

    pub fn with_parallel_downloads(mut self, parallel: usize) -> Self {
        self.parallel_downloads = parallel;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            redraw_delay: DEFAULT_REDRAW_DELAY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            archive_timeout_secs: DEFAULT_ARCHIVE_TIMEOUT_SECS,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            max_attempts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.rate_limit_backoff, Duration::from_secs(3600));
        assert_eq!(config.parallel_downloads, 15);
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn builder_overrides() {
        let config = RetryConfig::new()
            .with_rate_limit_backoff(Duration::from_millis(10))
            .with_redraw_delay(Duration::ZERO)
            .with_parallel_downloads(4)
            .with_max_attempts(3);
        assert_eq!(config.rate_limit_backoff, Duration::from_millis(10));
        assert_eq!(config.redraw_delay, Duration::ZERO);
        assert_eq!(config.parallel_downloads, 4);
        assert_eq!(config.max_attempts, Some(3));
    }
}

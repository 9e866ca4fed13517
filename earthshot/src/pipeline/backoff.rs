//! Injectable backoff for the retry loop.
//!
//! The loop never calls `tokio::time::sleep` directly; it goes through the
//! [`Backoff`] trait so tests can observe waits instead of serving them.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// Sleep strategy for the outer retry loop.
pub trait Backoff: Send + Sync {
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production backoff: real async sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioBackoff;

impl Backoff for TokioBackoff {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test backoff: records requested waits and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingBackoff {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Backoff for RecordingBackoff {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_backoff_captures_waits() {
        let backoff = RecordingBackoff::new();
        backoff.wait(Duration::from_secs(1)).await;
        backoff.wait(Duration::from_secs(3600)).await;
        assert_eq!(
            backoff.waits(),
            vec![Duration::from_secs(1), Duration::from_secs(3600)]
        );
    }

    #[tokio::test]
    async fn tokio_backoff_sleeps() {
        tokio::time::pause();
        let backoff = TokioBackoff;
        let start = tokio::time::Instant::now();
        backoff.wait(Duration::from_secs(10)).await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }
}

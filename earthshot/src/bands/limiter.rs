//! Bounded transfer concurrency.
//!
//! Parallel band/tile downloads within a cycle share one semaphore-backed
//! limiter so the pipeline never opens more transfers than configured.
//! Workers own distinct destination files, so the permit is the only shared
//! state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Semaphore-based limiter for concurrent file transfers.
#[derive(Debug)]
pub struct TransferLimiter {
    semaphore: Arc<Semaphore>,
    max_permits: usize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Held for the duration of one transfer; dropping it releases the permit.
pub struct TransferPermit<'a> {
    _permit: OwnedSemaphorePermit,
    limiter: &'a TransferLimiter,
}

impl TransferLimiter {
    /// Creates a limiter allowing `max_concurrent` simultaneous transfers.
    ///
    /// # Panics
    ///
    /// Panics if `max_concurrent` is 0.
    pub fn new(max_concurrent: usize) -> Self {
        assert!(max_concurrent > 0, "max_concurrent must be > 0");
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_permits: max_concurrent,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Waits for a permit.
    pub async fn acquire(&self) -> TransferPermit<'_> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("transfer limiter semaphore closed");

        let now = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::Relaxed);

        TransferPermit {
            _permit: permit,
            limiter: self,
        }
    }

    /// Maximum concurrent transfers allowed.
    pub fn max_permits(&self) -> usize {
        self.max_permits
    }

    /// Transfers currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Highest concurrency observed, for tuning.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }
}

impl Drop for TransferPermit<'_> {
    fn drop(&mut self) {
        self.limiter.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn permits_track_in_flight_count() {
        let limiter = TransferLimiter::new(4);
        assert_eq!(limiter.in_flight(), 0);

        let p1 = limiter.acquire().await;
        let p2 = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 2);
        assert_eq!(limiter.peak_in_flight(), 2);

        drop(p1);
        assert_eq!(limiter.in_flight(), 1);
        drop(p2);
        assert_eq!(limiter.in_flight(), 0);
        assert_eq!(limiter.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let limiter = Arc::new(TransferLimiter::new(3));
        let mut tasks = tokio::task::JoinSet::new();

        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                let _permit = limiter.acquire().await;
                assert!(limiter.in_flight() <= 3);
                tokio::time::sleep(Duration::from_millis(2)).await;
            });
        }

        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }
        assert!(limiter.peak_in_flight() <= 3);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[test]
    #[should_panic(expected = "max_concurrent must be > 0")]
    fn zero_limit_panics() {
        TransferLimiter::new(0);
    }
}

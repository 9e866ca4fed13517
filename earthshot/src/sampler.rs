//! Random candidate sampling.
//!
//! A candidate is a point on the globe plus a time window to search. The
//! latitude draw is deliberately non-uniform: a zero-mean normal scaled by
//! 90 degrees concentrates candidates in the tropics, where land coverage
//! and scene quality are better, and draws beyond the polar cutoff are
//! rejected and retried.

use crate::config::SearchConfig;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A candidate location and search window, immutable once drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub latitude: f64,
    pub longitude: f64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Draws candidates from the configured distributions.
///
/// The random source is passed in per draw so tests can use a seeded RNG.
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SearchConfig,
    latitude_dist: Normal<f64>,
}

impl Sampler {
    pub fn new(config: SearchConfig) -> Self {
        let latitude_dist =
            Normal::new(0.0, config.latitude_sigma).expect("latitude sigma is finite and positive");
        Self {
            config,
            latitude_dist,
        }
    }

    /// Draws one candidate. `now` bounds the time-window draw and is passed
    /// explicitly so tests are deterministic.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Candidate {
        let latitude = self.draw_latitude(rng);
        let longitude = (rng.gen::<f64>() * 2.0 - 1.0) * 180.0;
        let window_start = self.draw_window_start(rng, now);
        let window_end = window_start + Duration::days(self.config.window_days);

        Candidate {
            latitude,
            longitude,
            window_start,
            window_end,
        }
    }

    fn draw_latitude<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let latitude = self.latitude_dist.sample(rng) * 90.0;
            if latitude.abs() <= self.config.max_abs_latitude {
                return latitude;
            }
        }
    }

    fn draw_window_start<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
        let span_secs = (now - self.config.epoch).num_seconds();
        if span_secs <= 0 {
            return self.config.epoch;
        }
        self.config.epoch + Duration::seconds(rng.gen_range(0..span_secs))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

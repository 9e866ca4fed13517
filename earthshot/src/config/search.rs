//! Candidate sampling configuration.

use chrono::{DateTime, TimeZone, Utc};

/// Earliest acquisition date considered when drawing a random time window.
/// Sentinel-2 coverage before 2016 is too sparse to be worth querying.
pub fn default_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()
}

/// Length of the search window attached to each candidate, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 60;

/// Latitudes beyond this are resampled; tile coverage degrades at the poles.
pub const DEFAULT_MAX_ABS_LATITUDE: f64 = 85.0;

/// Standard deviation of the normal latitude draw, before scaling by 90.
pub const DEFAULT_LATITUDE_SIGMA: f64 = 0.99;

/// Configuration for the random candidate sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Start of the samplable time range.
    pub epoch: DateTime<Utc>,
    /// Window length added to each random start date.
    pub window_days: i64,
    /// Latitude clamp; draws outside `[-max, max]` are rejected and redrawn.
    pub max_abs_latitude: f64,
    /// Sigma of the zero-mean normal latitude distribution (scaled by 90).
    pub latitude_sigma: f64,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            window_days: DEFAULT_WINDOW_DAYS,
            max_abs_latitude: DEFAULT_MAX_ABS_LATITUDE,
            latitude_sigma: DEFAULT_LATITUDE_SIGMA,
        }
    }
}

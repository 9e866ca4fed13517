//! Duplicate-avoidance over recent posts.
//!
//! Keeps a bounded window of recently published acquisitions keyed by
//! region and acquisition date, so the same country is not posted twice in
//! quick succession. Keys are structured values; nothing is inferred from
//! caption text.

use chrono::NaiveDate;
use std::collections::VecDeque;

/// Identity of a published acquisition for duplicate checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostKey {
    region: String,
    date: NaiveDate,
}

impl PostKey {
    /// Region names are normalized (trimmed, lowercased) so geocoder
    /// capitalization differences don't defeat the check.
    pub fn new(region: &str, date: NaiveDate) -> Self {
        Self {
            region: region.trim().to_lowercase(),
            date,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Bounded window of recent post keys.
#[derive(Debug)]
pub struct PostHistory {
    capacity: usize,
    recent: VecDeque<PostKey>,
}

impl PostHistory {
    /// Creates a history remembering the last `capacity` posts.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    /// Whether publishing this key would repeat a recently posted region.
    pub fn would_repeat(&self, key: &PostKey) -> bool {
        self.recent.iter().any(|k| k.region == key.region)
    }

    /// Records a published key, evicting the oldest beyond capacity.
    pub fn record(&mut self, key: PostKey) {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}

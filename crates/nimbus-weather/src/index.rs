//! In-memory area index.
//!
//! The index holds one immutable [`Snapshot`] behind an `Arc`. A refresh builds
//! a complete new snapshot and swaps the pointer; readers clone the `Arc` once
//! and finish against that snapshot even if a newer one is installed meanwhile.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::types::{ForecastBatch, ForecastEntry};

/// Lowercase + trim, used for both snapshot keys and user input
pub fn normalize_area(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One fully-populated set of forecasts captured by a single refresh
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<String, ForecastEntry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The snapshot installed at startup, before any refresh succeeded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a fetched batch, stamping `cached_at = now`.
    ///
    /// If two provider areas normalize to the same key the first one is kept.
    pub fn from_batch(batch: ForecastBatch, now: DateTime<Utc>) -> Self {
        let mut entries = HashMap::with_capacity(batch.forecasts.len());

        for forecast in batch.forecasts {
            let key = normalize_area(&forecast.area);
            if entries.contains_key(&key) {
                tracing::debug!("Duplicate area '{}' in forecast batch, keeping first", key);
                continue;
            }
            entries.insert(
                key,
                ForecastEntry {
                    area: forecast.area.trim().to_string(),
                    forecast: forecast.forecast,
                    observed_at: batch.observed_at,
                    cached_at: now,
                },
            );
        }

        Self {
            entries,
            refreshed_at: Some(now),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ForecastEntry> {
        self.entries.get(key)
    }

    /// (normalized key, entry) pairs in unspecified order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ForecastEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical display names, sorted
    pub fn area_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.values().map(|e| e.area.clone()).collect();
        names.sort();
        names
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared holder of the current snapshot
#[derive(Debug)]
pub struct AreaIndex {
    current: RwLock<Arc<Snapshot>>,
    stale_after: Duration,
}

impl AreaIndex {
    /// Empty index; `stale_after` is normally the refresh interval
    pub fn new(stale_after: Duration) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
            stale_after,
        }
    }

    /// Grab the current snapshot. The lock is held only for the `Arc` clone.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Replace the active snapshot wholesale
    pub fn install(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, next)
        };
        // Dropped outside the lock; readers still holding it keep it alive.
        drop(previous);
    }

    pub fn lookup(&self, normalized_key: &str) -> Option<ForecastEntry> {
        self.snapshot().get(normalized_key).cloned()
    }

    /// Sorted canonical area names of the current snapshot
    pub fn keys(&self) -> Vec<String> {
        self.snapshot().area_names()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.snapshot().refreshed_at()
    }

    /// True when no refresh has succeeded within `stale_after`
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_refreshed() {
            None => true,
            // A negative span (clock went backwards) counts as fresh.
            Some(at) => (now - at)
                .to_std()
                .map(|elapsed| elapsed > self.stale_after)
                .unwrap_or(false),
        }
    }
}

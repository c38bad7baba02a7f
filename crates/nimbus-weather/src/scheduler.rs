//! Periodic refresh of the area index.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::index::{AreaIndex, Snapshot};
use crate::provider::ForecastSource;
use crate::types::FetchError;

/// Shortest interval the timer accepts; `tokio::time::interval` panics on zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Result of one refresh attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot with this many areas is now live
    Installed { areas: usize },
    /// Another cycle was already running (or the scheduler is stopped)
    Skipped,
    /// Fetch failed; the previous snapshot stays live
    Failed(FetchError),
}

/// Resets the in-flight flag however the cycle ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefreshScheduler<S> {
    source: Arc<S>,
    index: Arc<AreaIndex>,
    interval: Duration,
    in_flight: AtomicBool,
    started: AtomicBool,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ForecastSource + 'static> RefreshScheduler<S> {
    /// Construct without side effects; nothing runs until [`start`](Self::start).
    pub fn new(source: Arc<S>, index: Arc<AreaIndex>, interval: Duration) -> Self {
        Self {
            source,
            index,
            interval: interval.max(MIN_INTERVAL),
            in_flight: AtomicBool::new(false),
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True between `start` and `stop`
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.cancel.is_cancelled()
    }

    /// Run one fetch-and-install cycle.
    ///
    /// Returns `Skipped` immediately if a cycle is already in flight.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Weather refresh already in progress, skipping");
            return RefreshOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.in_flight);

        match self.source.fetch().await {
            Ok(batch) => {
                let snapshot = Snapshot::from_batch(batch, Utc::now());
                let areas = snapshot.len();
                self.index.install(snapshot);
                tracing::info!("Cached weather data for {} areas", areas);
                RefreshOutcome::Installed { areas }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cached_areas = self.index.len(),
                    "Weather refresh failed, keeping previous snapshot"
                );
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Refresh once (awaited), then arm the periodic timer.
    ///
    /// A second call, or a call after [`stop`](Self::stop), is a no-op that
    /// returns `Skipped`.
    pub async fn start(self: &Arc<Self>) -> RefreshOutcome {
        if self.cancel.is_cancelled() {
            tracing::warn!("Weather scheduler was stopped and cannot be restarted");
            return RefreshOutcome::Skipped;
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RefreshOutcome::Skipped;
        }

        let outcome = self.refresh_once().await;

        let this = Arc::clone(self);
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(Instant::now() + this.interval, this.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::info!("Periodic weather update");
                        this.refresh_once().await;
                    }
                }
            }
            tracing::debug!("Weather refresh loop stopped");
        });
        *self.task.lock() = Some(handle);

        tracing::info!(
            "Weather scheduler started (every {}s)",
            self.interval.as_secs()
        );
        outcome
    }

    /// Stop the periodic timer and wait for the loop to exit.
    ///
    /// A cycle already fetching finishes first (bounded by the fetch timeout).
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("Weather refresh task ended abnormally: {}", e);
            }
        }
    }
}

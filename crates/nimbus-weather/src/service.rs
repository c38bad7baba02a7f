//! Composition root: one index, one scheduler, one lookup facade.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use nimbus_core::WeatherConfig;

use crate::aliases::AliasTable;
use crate::events::{self, EventWeatherCheck, OutdoorEvent};
use crate::index::AreaIndex;
use crate::lookup::WeatherLookup;
use crate::provider::{ForecastProvider, ForecastSource};
use crate::scheduler::{RefreshOutcome, RefreshScheduler};
use crate::types::{AreaQuery, LookupResult};

/// Cache health as reported to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub areas: usize,
    pub stale: bool,
    pub last_refreshed: Option<DateTime<Utc>>,
}

pub struct WeatherService<S = ForecastProvider> {
    index: Arc<AreaIndex>,
    scheduler: Arc<RefreshScheduler<S>>,
    lookup: WeatherLookup,
}

impl WeatherService<ForecastProvider> {
    /// Build the service against the configured HTTP endpoint
    pub fn from_config(config: &WeatherConfig) -> Result<Self> {
        let provider = ForecastProvider::from_config(config)?;
        Ok(Self::new(provider, config))
    }
}

impl<S: ForecastSource + 'static> WeatherService<S> {
    /// Wire the parts together. Nothing is fetched until [`start`](Self::start).
    pub fn new(source: S, config: &WeatherConfig) -> Self {
        let interval = config.refresh_interval();
        let index = Arc::new(AreaIndex::new(interval));
        let aliases = Arc::new(AliasTable::from_config(&config.aliases));
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::new(source),
            Arc::clone(&index),
            interval,
        ));
        let lookup = WeatherLookup::new(Arc::clone(&index), aliases);

        Self {
            index,
            scheduler,
            lookup,
        }
    }

    /// Initial refresh, then periodic refreshes until [`stop`](Self::stop).
    ///
    /// A failed initial refresh is logged and the service keeps serving an
    /// empty index until a later cycle succeeds.
    pub async fn start(&self) -> RefreshOutcome {
        let outcome = self.scheduler.start().await;
        if let RefreshOutcome::Failed(e) = &outcome {
            tracing::warn!("Initial weather refresh failed: {}", e);
        }
        outcome
    }

    pub async fn stop(&self) {
        self.scheduler.stop().await;
        tracing::info!("Weather service stopped");
    }

    /// Out-of-band refresh; skipped if one is already running
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.scheduler.refresh_once().await
    }

    pub fn get_weather_for_area(&self, query: &AreaQuery) -> LookupResult {
        self.lookup.resolve_query(query)
    }

    pub fn resolve(&self, raw_area: &str) -> LookupResult {
        self.lookup.resolve(raw_area)
    }

    pub fn check_event_weather(&self, event: &OutdoorEvent) -> EventWeatherCheck {
        events::check_event_weather(&self.lookup, event)
    }

    pub fn annotate_reminders(&self, reminders: Vec<Value>) -> Vec<Value> {
        events::annotate_reminders(&self.lookup, reminders)
    }

    /// Canonical area names in the current snapshot, sorted
    pub fn get_all_areas(&self) -> Vec<String> {
        self.lookup.all_areas()
    }

    pub fn status(&self) -> ServiceStatus {
        let snapshot = self.index.snapshot();
        ServiceStatus {
            areas: snapshot.len(),
            stale: self.index.is_stale(),
            last_refreshed: snapshot.refreshed_at(),
        }
    }

    pub fn index(&self) -> &Arc<AreaIndex> {
        &self.index
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }
}

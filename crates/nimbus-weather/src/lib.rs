//! Region-wide weather cache and area lookup.
//!
//! A [`RefreshScheduler`] periodically pulls one forecast batch from a
//! [`ForecastSource`] and swaps it into the [`AreaIndex`]. Lookups resolve
//! free-form area text against whatever snapshot is live and never wait on
//! the network.

pub mod aliases;
pub mod classify;
pub mod events;
pub mod index;
pub mod lookup;
pub mod provider;
pub mod scheduler;
pub mod service;
pub mod types;

pub use aliases::AliasTable;
pub use events::{
    alert_for, annotate_reminders, check_event_weather, EventWeatherCheck, OutdoorEvent,
    WEATHER_ALERT,
};
pub use index::{normalize_area, AreaIndex, Snapshot};
pub use lookup::WeatherLookup;
pub use provider::{parse_payload, ForecastProvider, ForecastSource};
pub use scheduler::{RefreshOutcome, RefreshScheduler};
pub use service::{ServiceStatus, WeatherService};
pub use types::{
    AreaForecast, AreaQuery, ClassifiedForecast, FetchError, ForecastBatch, ForecastEntry,
    LookupResult, MatchKind, WeatherClassification, WeatherIcon,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use nimbus_core::{NetworkError, WeatherError};

/// One area's raw forecast as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaForecast {
    pub area: String,
    pub forecast: String,
}

/// Normalized result of a single fetch: non-empty list, provider timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastBatch {
    pub observed_at: DateTime<Utc>,
    pub forecasts: Vec<AreaForecast>,
}

/// Cached forecast for one area. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    /// Canonical display name as sent by the provider
    pub area: String,
    pub forecast: String,
    pub observed_at: DateTime<Utc>,
    pub cached_at: DateTime<Utc>,
}

/// Symbolic weather icon derived from forecast text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Thunderstorm,
    HeavyRain,
    Showers,
    Hazy,
    Windy,
    #[default]
    PartlySunny,
}

impl WeatherIcon {
    /// Stable identifier for front-ends that ship their own icon set
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Sunny => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Thunderstorm => "cloud_lightning",
            Self::HeavyRain => "cloud_rain",
            Self::Showers => "cloud_sun_rain",
            Self::Hazy => "cloud_fog",
            Self::Windy => "wind",
            Self::PartlySunny => "sun_cloud",
        }
    }

    /// Emoji glyph shown in reminder notifications
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Sunny => "\u{2600}\u{fe0f}",
            Self::PartlyCloudy => "\u{26c5}",
            Self::Cloudy => "\u{2601}\u{fe0f}",
            Self::Thunderstorm => "\u{26c8}\u{fe0f}",
            Self::HeavyRain => "\u{1f327}\u{fe0f}",
            Self::Showers => "\u{1f326}\u{fe0f}",
            Self::Hazy => "\u{1f32b}\u{fe0f}",
            Self::Windy => "\u{1f32c}\u{fe0f}",
            Self::PartlySunny => "\u{1f324}\u{fe0f}",
        }
    }
}

/// Derived on demand from forecast text, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherClassification {
    pub warning: bool,
    pub recommendation: String,
    pub icon: WeatherIcon,
}

/// A cached entry together with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedForecast {
    #[serde(flatten)]
    pub entry: ForecastEntry,
    #[serde(flatten)]
    pub classification: WeatherClassification,
}

/// Which matching step resolved a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Alias,
    Partial,
}

/// Outcome of resolving a free-form area string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found {
        weather: ClassifiedForecast,
        matched_by: MatchKind,
    },
    NotFound {
        requested_area: String,
        available_areas: Vec<String>,
    },
}

impl LookupResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The classified forecast, if found
    pub fn weather(&self) -> Option<&ClassifiedForecast> {
        match self {
            Self::Found { weather, .. } => Some(weather),
            Self::NotFound { .. } => None,
        }
    }

    pub fn into_weather(self) -> Option<ClassifiedForecast> {
        match self {
            Self::Found { weather, .. } => Some(weather),
            Self::NotFound { .. } => None,
        }
    }

    /// Caller-facing "not found" message, `None` when found
    pub fn not_found_message(&self) -> Option<String> {
        match self {
            Self::Found { .. } => None,
            Self::NotFound { requested_area, .. } => Some(format!(
                "Weather data not found for area: {}",
                requested_area
            )),
        }
    }
}

/// Lookup key as sent by collaborators: a bare string or `{ "name": ... }`.
/// Only `name` is read; other location fields (coordinates, place ids) are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaQuery {
    Name(String),
    Location {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        details: Map<String, Value>,
    },
}

impl AreaQuery {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Location { name, .. } => name.as_deref().unwrap_or_default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name().trim().is_empty()
    }
}

impl From<&str> for AreaQuery {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for AreaQuery {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Forecast fetch errors. Non-fatal: a failed cycle keeps the prior snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Weather provider unreachable: {0}")]
    Unreachable(String),
    #[error("Weather provider returned status {0}")]
    UpstreamStatus(u16),
    #[error("Invalid forecast payload: {0}")]
    InvalidShape(String),
}

impl From<NetworkError> for FetchError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Timeout => FetchError::Unreachable("request timed out".to_string()),
            NetworkError::ConnectionFailed(msg) => FetchError::Unreachable(msg),
            NetworkError::ServerError { status, .. } => FetchError::UpstreamStatus(status),
            NetworkError::InvalidResponse(msg) => FetchError::InvalidShape(msg),
        }
    }
}

impl From<FetchError> for WeatherError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Unreachable(msg) => WeatherError::Unreachable(msg),
            FetchError::UpstreamStatus(code) => WeatherError::UpstreamStatus(code),
            FetchError::InvalidShape(msg) => WeatherError::InvalidShape(msg),
        }
    }
}

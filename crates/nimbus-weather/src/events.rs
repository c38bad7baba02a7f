//! Weather checks for outdoor reminders and calendar events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lookup::WeatherLookup;
use crate::types::{AreaQuery, ClassifiedForecast, LookupResult};

pub const WEATHER_ALERT: &str = "Weather Alert";
const INDOOR_MESSAGE: &str = "Indoor event - no weather check needed";

/// The fields of a reminder or calendar event that matter for a weather check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdoorEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<AreaQuery>,
    #[serde(default)]
    pub is_outdoor: bool,
}

impl OutdoorEvent {
    /// Read the weather-relevant fields out of a raw reminder object.
    /// Missing or mistyped fields fall back to their defaults.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            title: fields
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            location: fields
                .get("location")
                .and_then(|v| AreaQuery::deserialize(v).ok()),
            is_outdoor: fields
                .get("isOutdoor")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// The location to look up, if this event needs a weather check at all
    fn weather_location(&self) -> Option<&AreaQuery> {
        if !self.is_outdoor {
            return None;
        }
        self.location.as_ref().filter(|l| !l.is_blank())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub title: String,
    pub location: AreaQuery,
    pub is_outdoor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWeatherCheck {
    pub needs_weather: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<ClassifiedForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<AreaQuery>,
}

impl EventWeatherCheck {
    fn indoor() -> Self {
        Self {
            needs_weather: false,
            event: None,
            weather: None,
            alert: None,
            message: Some(INDOOR_MESSAGE.to_string()),
            error: None,
            location: None,
        }
    }
}

/// Check whether an outdoor item is affected by the weather at its location.
///
/// Indoor items and items without a location never touch the index.
pub fn check_event_weather(lookup: &WeatherLookup, event: &OutdoorEvent) -> EventWeatherCheck {
    let Some(location) = event.weather_location() else {
        return EventWeatherCheck::indoor();
    };

    let result = lookup.resolve_query(location);
    if let Some(error) = result.not_found_message() {
        return EventWeatherCheck {
            needs_weather: true,
            event: None,
            weather: None,
            alert: None,
            message: None,
            error: Some(error),
            location: Some(location.clone()),
        };
    }

    let alert = alert_for(&result);
    let Some(weather) = result.into_weather() else {
        return EventWeatherCheck::indoor();
    };
    let message = if alert.is_some() {
        format!(
            "Weather warning for {}: {}",
            event.title, weather.classification.recommendation
        )
    } else {
        format!("Good weather for {}", event.title)
    };

    EventWeatherCheck {
        needs_weather: true,
        event: Some(EventSummary {
            title: event.title.clone(),
            location: location.clone(),
            is_outdoor: event.is_outdoor,
        }),
        weather: Some(weather),
        alert: alert.map(str::to_string),
        message: Some(message),
        error: None,
        location: None,
    }
}

/// Attach weather to every outdoor reminder that has a location.
///
/// Reminders are kept as sent: only `weather` and `weatherAlert` are written,
/// and entries that are not objects come back untouched.
pub fn annotate_reminders(lookup: &WeatherLookup, reminders: Vec<Value>) -> Vec<Value> {
    reminders
        .into_iter()
        .map(|reminder| match reminder {
            Value::Object(fields) => Value::Object(annotate_reminder(lookup, fields)),
            other => other,
        })
        .collect()
}

fn annotate_reminder(
    lookup: &WeatherLookup,
    mut fields: Map<String, Value>,
) -> Map<String, Value> {
    let event = OutdoorEvent::from_fields(&fields);
    if event.weather_location().is_none() {
        return fields;
    }

    let check = check_event_weather(lookup, &event);
    tracing::debug!(
        "Weather for reminder '{}': {}",
        event.title,
        check
            .weather
            .as_ref()
            .map(|w| w.entry.forecast.as_str())
            .unwrap_or("not found")
    );

    let weather = match check.weather.map(serde_json::to_value).transpose() {
        Ok(weather) => weather.unwrap_or(Value::Null),
        Err(e) => {
            tracing::warn!("Failed to serialize weather for '{}': {}", event.title, e);
            Value::Null
        }
    };
    // Overwrites any annotation from an earlier pass
    fields.insert("weather".to_string(), weather);
    fields.insert(
        "weatherAlert".to_string(),
        check.alert.map(Value::String).unwrap_or(Value::Null),
    );
    fields
}

/// The weather alert label for a lookup, `None` unless it carries a warning
pub fn alert_for(result: &LookupResult) -> Option<&'static str> {
    result
        .weather()
        .filter(|w| w.classification.warning)
        .map(|_| WEATHER_ALERT)
}

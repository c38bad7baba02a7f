//! Forecast text classification.
//!
//! Every rule is a case-insensitive substring test. Rule tables are ordered:
//! severe phrases sit above milder ones they overlap with ("heavy rain" before
//! "rain"), and the first matching row wins.

use crate::types::{WeatherClassification, WeatherIcon};

/// Phrases that put an outdoor item on alert. Any one is enough.
const WARNING_PHRASES: &[&str] = &[
    "thundery showers",
    "heavy rain",
    "rain",
    "showers",
    "thunderstorm",
    "stormy",
    "windy",
    "hazy",
];

const SHELTER_ADVICE: &str = "Stay indoors or seek shelter. Avoid outdoor activities.";
const HEAVY_RAIN_ADVICE: &str =
    "Bring umbrella and waterproof gear. Consider postponing outdoor events.";
const RAIN_ADVICE: &str = "Bring umbrella or raincoat for outdoor activities.";
const HAZE_ADVICE: &str = "Consider wearing a mask if you have respiratory issues.";
const HEAT_ADVICE: &str = "Stay hydrated and seek shade during outdoor activities.";
pub const DEFAULT_RECOMMENDATION: &str = "Good weather for outdoor activities!";

const RECOMMENDATION_RULES: &[(&[&str], &str)] = &[
    (&["thundery", "thunderstorm"], SHELTER_ADVICE),
    (&["heavy rain"], HEAVY_RAIN_ADVICE),
    (&["rain", "showers"], RAIN_ADVICE),
    (&["hazy"], HAZE_ADVICE),
    (&["hot", "warm"], HEAT_ADVICE),
];

const ICON_RULES: &[(&[&str], WeatherIcon)] = &[
    (&["sunny", "fair"], WeatherIcon::Sunny),
    (&["partly cloudy"], WeatherIcon::PartlyCloudy),
    (&["cloudy"], WeatherIcon::Cloudy),
    (&["thundery", "thunderstorm"], WeatherIcon::Thunderstorm),
    (&["heavy rain"], WeatherIcon::HeavyRain),
    (&["rain", "showers"], WeatherIcon::Showers),
    (&["hazy", "mist"], WeatherIcon::Hazy),
    (&["windy"], WeatherIcon::Windy),
];

fn first_match<T: Copy>(text: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(_, value)| *value)
}

/// True if the forecast mentions any adverse condition
pub fn has_warning(text: &str) -> bool {
    let lower = text.to_lowercase();
    WARNING_PHRASES.iter().any(|p| lower.contains(p))
}

/// Advice for outdoor plans, most severe matching rule first
pub fn recommendation(text: &str) -> &'static str {
    first_match(text, RECOMMENDATION_RULES).unwrap_or(DEFAULT_RECOMMENDATION)
}

pub fn icon(text: &str) -> WeatherIcon {
    first_match(text, ICON_RULES).unwrap_or_default()
}

pub fn classify(text: &str) -> WeatherClassification {
    WeatherClassification {
        warning: has_warning(text),
        recommendation: recommendation(text).to_string(),
        icon: icon(text),
    }
}

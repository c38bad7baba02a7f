//! Free-form area resolution against the current snapshot.
//!
//! Matching runs in a fixed order and the first hit wins:
//! exact key, alias target, then partial (substring either way).
//! Partial matching is a linear scan, fine for the few dozen areas a provider
//! publishes. When several keys match, the one whose length is closest to the
//! input wins and remaining ties go to the alphabetically first key, so the
//! result never depends on hash-map iteration order.

use std::sync::Arc;

use crate::aliases::AliasTable;
use crate::classify;
use crate::index::{normalize_area, AreaIndex, Snapshot};
use crate::types::{AreaQuery, ClassifiedForecast, ForecastEntry, LookupResult, MatchKind};

#[derive(Debug, Clone)]
pub struct WeatherLookup {
    index: Arc<AreaIndex>,
    aliases: Arc<AliasTable>,
}

impl WeatherLookup {
    pub fn new(index: Arc<AreaIndex>, aliases: Arc<AliasTable>) -> Self {
        Self { index, aliases }
    }

    /// Resolve against whatever snapshot is live right now
    pub fn resolve(&self, raw_area: &str) -> LookupResult {
        let snapshot = self.index.snapshot();
        resolve_in(&snapshot, &self.aliases, raw_area)
    }

    pub fn resolve_query(&self, query: &AreaQuery) -> LookupResult {
        self.resolve(query.name())
    }

    pub fn all_areas(&self) -> Vec<String> {
        self.index.keys()
    }
}

/// Resolve `raw_area` within one snapshot
pub fn resolve_in(snapshot: &Snapshot, aliases: &AliasTable, raw_area: &str) -> LookupResult {
    let needle = normalize_area(raw_area);

    match find(snapshot, aliases, &needle) {
        Some((entry, matched_by)) => {
            tracing::debug!("Resolved '{}' to '{}' via {:?}", raw_area, entry.area, matched_by);
            LookupResult::Found {
                weather: ClassifiedForecast {
                    entry: entry.clone(),
                    classification: classify::classify(&entry.forecast),
                },
                matched_by,
            }
        }
        None => LookupResult::NotFound {
            requested_area: raw_area.trim().to_string(),
            available_areas: snapshot.area_names(),
        },
    }
}

fn find<'a>(
    snapshot: &'a Snapshot,
    aliases: &AliasTable,
    needle: &str,
) -> Option<(&'a ForecastEntry, MatchKind)> {
    if let Some(entry) = snapshot.get(needle) {
        return Some((entry, MatchKind::Exact));
    }

    if let Some(target) = aliases.target(needle) {
        if let Some(entry) = snapshot.get(&normalize_area(target)) {
            return Some((entry, MatchKind::Alias));
        }
    }

    partial_match(snapshot, needle).map(|entry| (entry, MatchKind::Partial))
}

fn partial_match<'a>(snapshot: &'a Snapshot, needle: &str) -> Option<&'a ForecastEntry> {
    // "" is a substring of every key
    if needle.is_empty() {
        return None;
    }

    snapshot
        .entries()
        .filter(|(key, _)| key.contains(needle) || needle.contains(key))
        .min_by(|(a, _), (b, _)| {
            let dist = |k: &str| k.len().abs_diff(needle.len());
            dist(*a).cmp(&dist(*b)).then_with(|| a.cmp(b))
        })
        .map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{AreaForecast, ForecastBatch};
    use chrono::Utc;
    use std::time::Duration;

    fn snapshot(areas: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_batch(
            ForecastBatch {
                observed_at: Utc::now(),
                forecasts: areas
                    .iter()
                    .map(|(area, forecast)| AreaForecast {
                        area: area.to_string(),
                        forecast: forecast.to_string(),
                    })
                    .collect(),
            },
            Utc::now(),
        )
    }

    fn lookup_with(areas: &[(&str, &str)], aliases: AliasTable) -> WeatherLookup {
        let index = Arc::new(AreaIndex::new(Duration::from_secs(1800)));
        index.install(snapshot(areas));
        WeatherLookup::new(index, Arc::new(aliases))
    }

    fn orchard_lookup() -> WeatherLookup {
        lookup_with(
            &[("Orchard", "Partly Cloudy (Day)")],
            AliasTable::empty().with_overrides([("orchard road".to_string(), "orchard".to_string())]),
        )
    }

    fn matched_by(result: &LookupResult) -> MatchKind {
        match result {
            LookupResult::Found { matched_by, .. } => *matched_by,
            LookupResult::NotFound { .. } => panic!("expected a match, got {:?}", result),
        }
    }

    #[test]
    fn test_alias_path() {
        let result = orchard_lookup().resolve("Orchard Road");
        assert_eq!(matched_by(&result), MatchKind::Alias);
        assert_eq!(result.weather().unwrap().entry.area, "Orchard");
    }

    #[test]
    fn test_exact_path() {
        let result = orchard_lookup().resolve("orchard");
        assert_eq!(matched_by(&result), MatchKind::Exact);
    }

    #[test]
    fn test_substring_path() {
        let result = orchard_lookup().resolve("orch");
        assert_eq!(matched_by(&result), MatchKind::Partial);
        assert_eq!(result.weather().unwrap().entry.area, "Orchard");
    }

    #[test]
    fn test_not_found_lists_available_areas() {
        let result = orchard_lookup().resolve("sentosa");
        assert_eq!(
            result,
            LookupResult::NotFound {
                requested_area: "sentosa".to_string(),
                available_areas: vec!["Orchard".to_string()],
            }
        );
    }

    #[test]
    fn test_input_containing_key_matches() {
        let result = orchard_lookup().resolve("  ION Orchard mall ");
        assert_eq!(matched_by(&result), MatchKind::Partial);
    }

    #[test]
    fn test_exact_beats_alias() {
        // "jurong" would alias to Jurong East, but an exact area exists
        let lookup = lookup_with(
            &[("Jurong", "Fair"), ("Jurong East", "Showers")],
            AliasTable::builtin(),
        );
        let result = lookup.resolve("Jurong");
        assert_eq!(matched_by(&result), MatchKind::Exact);
        assert_eq!(result.weather().unwrap().entry.forecast, "Fair");
    }

    #[test]
    fn test_alias_target_absent_falls_through() {
        let lookup = lookup_with(&[("Bedok", "Fair")], AliasTable::builtin());
        let result = lookup.resolve("changi airport");
        assert!(!result.is_found());
    }

    #[test]
    fn test_partial_tie_break_is_deterministic() {
        let lookup = lookup_with(
            &[
                ("Jurong West", "Showers"),
                ("Jurong East", "Fair"),
                ("Jurong Island", "Cloudy"),
            ],
            AliasTable::empty(),
        );
        // all three contain "jurong"; two share the closest length, alphabetical wins
        let result = lookup.resolve("jurong");
        assert_eq!(result.weather().unwrap().entry.area, "Jurong East");

        let result = lookup.resolve("jurong is");
        assert_eq!(result.weather().unwrap().entry.area, "Jurong Island");
    }

    #[test]
    fn test_blank_input_is_not_found() {
        let lookup = orchard_lookup();
        assert!(!lookup.resolve("").is_found());
        assert!(!lookup.resolve("   ").is_found());
    }

    #[test]
    fn test_found_carries_classification() {
        let lookup = lookup_with(&[("Bedok", "Heavy Rain")], AliasTable::empty());
        let weather = lookup.resolve("BEDOK").into_weather().unwrap();
        assert!(weather.classification.warning);
        assert!(weather.classification.recommendation.contains("waterproof"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let lookup = lookup_with(
            &[("Bedok", "Fair"), ("Bishan", "Showers"), ("Bukit Timah", "Cloudy")],
            AliasTable::builtin(),
        );
        for input in ["bedok", "b", "Bukit", "changi", "Bishan Park"] {
            assert_eq!(lookup.resolve(input), lookup.resolve(input), "input {}", input);
        }
    }

    #[test]
    fn test_resolve_query_object() {
        let lookup = orchard_lookup();
        let query: AreaQuery = serde_json::from_str(r#"{"name": "Orchard Road"}"#).unwrap();
        assert!(lookup.resolve_query(&query).is_found());
    }

    #[test]
    fn test_empty_index_is_not_found() {
        let index = Arc::new(AreaIndex::new(Duration::from_secs(1800)));
        let lookup = WeatherLookup::new(index, Arc::new(AliasTable::builtin()));
        assert_eq!(
            lookup.resolve("Orchard"),
            LookupResult::NotFound {
                requested_area: "Orchard".to_string(),
                available_areas: vec![],
            }
        );
    }
}

//! Free-form location phrases mapped to the provider's canonical area names.

use std::collections::HashMap;

use crate::index::normalize_area;

/// Landmarks and common spellings for the Singapore nowcast areas.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("marina bay", "Marina Bay"),
    ("orchard road", "Orchard"),
    ("orchard", "Orchard"),
    ("chinatown", "Chinatown"),
    ("little india", "Little India"),
    ("bugis", "Bugis"),
    ("raffles place", "Raffles Place"),
    ("clarke quay", "Clarke Quay"),
    ("sentosa", "Sentosa"),
    ("jurong east", "Jurong East"),
    ("jurong", "Jurong East"),
    ("tampines", "Tampines"),
    ("woodlands", "Woodlands"),
    ("changi", "Changi"),
    ("changi airport", "Changi"),
    ("toa payoh", "Toa Payoh"),
    ("ang mo kio", "Ang Mo Kio"),
    ("bedok", "Bedok"),
    ("clementi", "Clementi"),
    ("bishan", "Bishan"),
    ("punggol", "Punggol"),
    ("sengkang", "Sengkang"),
    ("hougang", "Hougang"),
    ("pasir ris", "Pasir Ris"),
    ("yishun", "Yishun"),
    ("serangoon", "Serangoon"),
    ("novena", "Novena"),
    ("dhoby ghaut", "Dhoby Ghaut"),
    ("city hall", "City"),
    ("downtown", "Downtown Core"),
    ("east coast", "East Coast"),
    ("west coast", "West Coast"),
];

/// Read-only alias table. Keys are normalized; targets keep canonical casing.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in landmark table
    pub fn builtin() -> Self {
        Self::empty().with_overrides(
            BUILTIN_ALIASES
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string())),
        )
    }

    /// Built-in table with configured aliases layered on top
    pub fn from_config<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        Self::builtin().with_overrides(extra.into_iter().map(|(a, t)| (a.clone(), t.clone())))
    }

    /// Add or replace entries. Blank aliases or targets are dropped.
    pub fn with_overrides<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (alias, target) in entries {
            let key = normalize_area(&alias);
            let target = target.trim();
            if key.is_empty() || target.is_empty() {
                tracing::debug!("Skipping blank alias entry '{}' -> '{}'", alias, target);
                continue;
            }
            self.entries.insert(key, target.to_string());
        }
        self
    }

    /// Canonical target for an already-normalized phrase
    pub fn target(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! # Address Module
//!
//! The provider's open mapping of named address fields.
//!
//! Nominatim reports whatever administrative and locality levels OSM knows
//! about a place (`country`, `state`, `county`, `suburb`, `road`, `postcode`,
//! `ISO3166-2-lvl4`, ...). The set of keys varies per country, so the
//! address is kept as an ordered map rather than a fixed struct.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of ISO 3166-2 subdivision keys, followed by the OSM admin level.
const ISO_SUBDIVISION_PREFIX: &str = "ISO3166-2-lvl";

/// An ISO 3166-2 subdivision code together with its OSM admin level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoSubdivision {
    pub level: u8,
    pub code: String,
}

/// Named address fields reported by a provider.
///
/// Empty values are kept as received but treated as absent by every
/// accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    fields: BTreeMap<String, String>,
}

impl Address {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style [`Address::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a non-empty field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`, in order.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(String::is_empty)
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// ISO 3166-2 subdivision codes below country level (admin level > 2).
    ///
    /// Returned in ascending admin level, so the largest area comes first.
    #[must_use]
    pub fn iso_subdivisions(&self) -> Vec<IsoSubdivision> {
        let mut found: Vec<IsoSubdivision> = self
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .filter_map(|(k, v)| {
                let level = parse_iso_level(k)?;
                (level > 2).then(|| IsoSubdivision {
                    level,
                    code: v.to_string(),
                })
            })
            .collect();
        found.sort_by_key(|s| s.level);
        found
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Address {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse the admin level out of an `ISO3166-2-lvl<N>` key (one or two digits).
fn parse_iso_level(key: &str) -> Option<u8> {
    let digits = key.strip_prefix(ISO_SUBDIVISION_PREFIX)?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Case-insensitive comparison of trimmed strings.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

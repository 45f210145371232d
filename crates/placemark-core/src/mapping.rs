//! # Mapping Module
//!
//! Field-selection heuristic: provider address → country / state / city.
//!
//! OSM admin levels mean different things per country, so the heuristic
//! works in layers:
//!
//! - **state**: prefer an ISO 3166-2 subdivision code paired with a human
//!   name at a comparable level, then fall back through a fixed ladder of
//!   administrative keys, then (for city-states) promote the suburb.
//! - **city**: a compact, de-duplicated string of the most informative
//!   locality parts, POI first and postcode last.
//!
//! Results coarser than [`MIN_PLACE_RANK`] are discarded.

use crate::address::{IsoSubdivision, eq_ignore_case};
use crate::formats::Place;
use crate::{Address, ReverseGeocodeResult};
use std::collections::BTreeSet;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Results with a `place_rank` below this are too coarse (country/state level).
pub const MIN_PLACE_RANK: i64 = 10;

/// Administrative keys tried, in order, when no ISO-paired name is found.
const STATE_FALLBACK_KEYS: &[&str] = &[
    "region",
    "state",
    "province",
    "state_district",
    "county",
    "municipality",
    "city_district",
    "district",
    "borough",
    "subregion",
    "subdivision",
];

/// Keys promoted to state for city-states.
const CITY_STATE_KEYS: &[&str] = &["suburb", "quarter", "neighbourhood"];

/// Countries that are a single city.
const CITY_STATES: &[&str] = &["monaco", "singapore", "vatican city"];

const POI_KEYS: &[&str] = &[
    "amenity",
    "shop",
    "leisure",
    "tourism",
    "office",
    "building",
    "house_name",
];

/// Smallest named locality first.
const LOCALITY_KEYS: &[&str] = &["neighbourhood", "quarter", "suburb", "village", "town", "city"];

const DISTRICT_KEYS: &[&str] = &["city_district", "borough", "district"];

// =============================================================================
// OUTCOME
// =============================================================================

/// What a provider answer amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A usable place description.
    Resolved(ReverseGeocodeResult),
    /// The provider reported an error or returned nothing.
    ProviderError(String),
    /// The match is coarser than [`MIN_PLACE_RANK`].
    TooCoarse(i64),
}

/// Map a provider answer to a place description.
#[must_use]
pub fn map_place(place: &Place) -> Outcome {
    if let Some(error) = &place.error {
        return Outcome::ProviderError(error.clone());
    }
    if !place.has_result() {
        return Outcome::ProviderError("No result".to_string());
    }
    if let Some(rank) = place.place_rank {
        if rank < MIN_PLACE_RANK {
            return Outcome::TooCoarse(rank);
        }
    }
    Outcome::Resolved(map_address(&place.address))
}

/// Apply the heuristic to an address, ignoring rank.
#[must_use]
pub fn map_address(address: &Address) -> ReverseGeocodeResult {
    let iso = best_iso_subdivision(address);
    let state_name = state_name(address, iso.as_ref());
    let city = build_city(address, state_name);
    let state = format_state(state_name, iso.as_ref());

    ReverseGeocodeResult {
        country: address.get("country").map(str::to_string),
        state,
        city,
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Largest administrative unit below country that carries an ISO code.
#[must_use]
pub fn best_iso_subdivision(address: &Address) -> Option<IsoSubdivision> {
    address.iso_subdivisions().into_iter().next()
}

/// Human name at roughly the granularity of an OSM admin level.
#[must_use]
pub fn name_for_iso_level(address: &Address, level: u8) -> Option<&str> {
    let keys: &[&str] = match level {
        0..=4 => &["region", "state", "province"],
        5..=6 => &["state_district", "county", "district"],
        7..=8 => &["municipality", "city", "town"],
        _ => &["city_district", "borough", "suburb", "quarter", "neighbourhood"],
    };
    address.first_of(keys)
}

/// City equals country, or the country is a known city-state.
#[must_use]
pub fn is_city_state(address: &Address) -> bool {
    let (Some(country), Some(city)) = (address.get("country"), address.get("city")) else {
        return false;
    };
    let country = country.to_lowercase();
    city.to_lowercase() == country || CITY_STATES.contains(&country.as_str())
}

fn state_name<'a>(address: &'a Address, iso: Option<&IsoSubdivision>) -> Option<&'a str> {
    iso.and_then(|iso| name_for_iso_level(address, iso.level))
        .or_else(|| address.first_of(STATE_FALLBACK_KEYS))
        .or_else(|| {
            is_city_state(address)
                .then(|| address.first_of(CITY_STATE_KEYS))
                .flatten()
        })
}

fn format_state(name: Option<&str>, iso: Option<&IsoSubdivision>) -> Option<String> {
    match (name, iso) {
        (Some(name), Some(iso)) => Some(format!("{} ({})", name, iso.code)),
        (None, Some(iso)) => Some(iso.code.clone()),
        (Some(name), None) => Some(name.to_string()),
        (None, None) => None,
    }
}

// =============================================================================
// CITY
// =============================================================================

/// Build the compact locality string.
///
/// Order: POI, house number, road, locality, district, postcode. The
/// district is skipped when it names the same thing as the state.
#[must_use]
pub fn build_city(address: &Address, state_name: Option<&str>) -> Option<String> {
    let locality = address.first_of(LOCALITY_KEYS);
    let district = address.first_of(DISTRICT_KEYS).filter(|district| {
        !state_name.is_some_and(|s| eq_ignore_case(district, s))
            && !locality.is_some_and(|l| eq_ignore_case(district, l))
    });

    let parts = [
        address.first_of(POI_KEYS),
        address.get("house_number"),
        address.get("road"),
        locality,
        district,
        address.get("postcode"),
    ];

    let joined = dedup_parts(parts.into_iter().flatten()).join(", ");
    (!joined.is_empty()).then_some(joined)
}

/// Trim, drop empties and keep the first of case-insensitive duplicates.
fn dedup_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty() && seen.insert(p.to_lowercase()))
        .collect()
}

//! # Placemark Core - The Logic
//!
//! Deterministic reverse-geocoding logic for Placemark.
//!
//! This crate turns a reverse-geocoding provider's answer into a compact
//! place description (country, state, city) and keeps a local gazetteer
//! that serves as the fallback when the provider has nothing to say.
//!
//! ## Layout
//!
//! - [`address`]: the provider's open mapping of address fields
//! - [`formats`]: Nominatim `jsonv2` and XML response parsing
//! - [`mapping`]: the field-selection heuristic
//! - [`storage`]: local place repository (in-memory and redb)
//!
//! The crate is synchronous and never touches the network. HTTP, async and
//! process wiring live in `apps/placemark`.

pub mod address;
pub mod formats;
pub mod mapping;
pub mod storage;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use address::Address;
pub use formats::{Place, ResponseFormat, parse_json, parse_response, parse_xml};
pub use mapping::{MIN_PLACE_RANK, Outcome, map_place};
pub use storage::{GridCell, MemoryPlaces, PlaceRecord, PlaceRepository, RedbPlaces};

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from Placemark core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Latitude/longitude outside the valid range or not finite.
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Provider response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local database failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored value could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    /// JSON input could not be read.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Refused to overwrite an existing database.
    #[error("Database already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Invalid runtime configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// GEO POINT
// =============================================================================

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

// =============================================================================
// REVERSE GEOCODE RESULT
// =============================================================================

/// A human-readable place description.
///
/// `city` is a compact locality string rather than a bare city name, e.g.
/// `"Hofbräuhaus, 9, Platzl, Graggenau, Altstadt-Lehel, 80331"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseGeocodeResult {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl ReverseGeocodeResult {
    #[must_use]
    pub fn new(
        country: Option<String>,
        state: Option<String>,
        city: Option<String>,
    ) -> Self {
        Self {
            country,
            state,
            city,
        }
    }

    /// True when no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.state.is_none() && self.city.is_none()
    }
}

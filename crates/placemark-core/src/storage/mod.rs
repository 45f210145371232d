//! # Storage Module
//!
//! Local place repository used as the reverse-geocoding fallback.
//!
//! The repository is a gazetteer bucketed by [`GridCell`]: a lookup is a
//! single keyed read of the cell containing the point. There is no distance
//! computation and no spatial index.
//!
//! Implementations:
//! - [`MemoryPlaces`]: BTreeMap-backed, for tests and ephemeral runs
//! - [`RedbPlaces`]: disk-backed via the redb embedded database

mod redb_places;

pub use redb_places::RedbPlaces;

use crate::{Error, GeoPoint, ReverseGeocodeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grid resolution: cells per degree (0.1° ≈ 11 km of latitude).
pub const CELLS_PER_DEGREE: f64 = 10.0;

// =============================================================================
// PLACE REPOSITORY TRAIT
// =============================================================================

/// A local source of place descriptions.
pub trait PlaceRepository: Send + Sync {
    /// Look up the place for a point. `Ok(None)` when nothing is stored.
    fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<ReverseGeocodeResult>, Error>;
}

// =============================================================================
// GRID CELL
// =============================================================================

/// A 0.1° × 0.1° bucket of the lat/lon plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    pub lat: i32,
    pub lon: i32,
}

impl GridCell {
    /// The cell containing `point`.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn containing(point: &GeoPoint) -> Self {
        Self {
            lat: (point.latitude * CELLS_PER_DEGREE).floor() as i32,
            lon: (point.longitude * CELLS_PER_DEGREE).floor() as i32,
        }
    }

    pub(crate) fn key(self) -> (i32, i32) {
        (self.lat, self.lon)
    }
}

// =============================================================================
// PLACE RECORD
// =============================================================================

/// One gazetteer entry, as found in import files.
///
/// ```json
/// {"latitude": 48.1374, "longitude": 11.5755, "country": "Deutschland",
///  "state": "Bayern", "city": "München"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl PlaceRecord {
    /// Validated location of this record.
    pub fn point(&self) -> Result<GeoPoint, Error> {
        GeoPoint::new(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn result(&self) -> ReverseGeocodeResult {
        ReverseGeocodeResult::new(self.country.clone(), self.state.clone(), self.city.clone())
    }
}

/// Parse an import file: a JSON array of [`PlaceRecord`].
pub fn parse_records(json: &str) -> Result<Vec<PlaceRecord>, Error> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// IN-MEMORY REPOSITORY
// =============================================================================

/// In-memory gazetteer.
#[derive(Debug, Default, Clone)]
pub struct MemoryPlaces {
    cells: BTreeMap<GridCell, ReverseGeocodeResult>,
}

impl MemoryPlaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing whatever its cell held.
    pub fn insert(&mut self, record: &PlaceRecord) -> Result<(), Error> {
        let cell = GridCell::containing(&record.point()?);
        self.cells.insert(cell, record.result());
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl PlaceRepository for MemoryPlaces {
    fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<ReverseGeocodeResult>, Error> {
        Ok(self.cells.get(&GridCell::containing(point)).cloned())
    }
}

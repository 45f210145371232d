//! Disk-backed gazetteer on redb.
//!
//! One table, `places`, keyed by grid cell `(lat, lon)`. Values are
//! postcard-encoded [`ReverseGeocodeResult`]s.

use super::{GridCell, PlaceRecord, PlaceRepository};
use crate::{Error, GeoPoint, ReverseGeocodeResult};
use redb::{Database, ReadableDatabase, ReadableTableMetadata, TableDefinition};
use std::path::Path;

const PLACES: TableDefinition<(i32, i32), &[u8]> = TableDefinition::new("places");

fn storage_error(e: impl Into<redb::Error>) -> Error {
    Error::Storage(e.into().to_string())
}

/// redb-backed place repository.
pub struct RedbPlaces {
    db: Database,
}

impl RedbPlaces {
    /// Create (or open) a database at `path` and make sure the table exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let db = Database::create(path).map_err(storage_error)?;
        let txn = db.begin_write().map_err(storage_error)?;
        txn.open_table(PLACES).map_err(storage_error)?;
        txn.commit().map_err(storage_error)?;
        Ok(Self { db })
    }

    /// Open an existing database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let db = Database::open(path).map_err(storage_error)?;
        Ok(Self { db })
    }

    /// Store a single record.
    pub fn insert(&self, record: &PlaceRecord) -> Result<(), Error> {
        self.import(std::slice::from_ref(record)).map(|_| ())
    }

    /// Store records in one transaction. Returns how many were written.
    ///
    /// Records sharing a cell overwrite each other in order.
    pub fn import(&self, records: &[PlaceRecord]) -> Result<usize, Error> {
        let txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = txn.open_table(PLACES).map_err(storage_error)?;
            for record in records {
                let cell = GridCell::containing(&record.point()?);
                let bytes = postcard::to_allocvec(&record.result())?;
                table
                    .insert(cell.key(), bytes.as_slice())
                    .map_err(storage_error)?;
            }
        }
        txn.commit().map_err(storage_error)?;
        Ok(records.len())
    }

    /// Number of occupied cells.
    pub fn len(&self) -> Result<u64, Error> {
        let txn = self.db.begin_read().map_err(storage_error)?;
        let table = txn.open_table(PLACES).map_err(storage_error)?;
        table.len().map_err(storage_error)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

impl PlaceRepository for RedbPlaces {
    fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<ReverseGeocodeResult>, Error> {
        let txn = self.db.begin_read().map_err(storage_error)?;
        let table = txn.open_table(PLACES).map_err(storage_error)?;
        let key = GridCell::containing(point).key();
        match table.get(key).map_err(storage_error)? {
            Some(guard) => Ok(Some(postcard::from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }
}

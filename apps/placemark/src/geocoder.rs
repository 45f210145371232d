//! # Hybrid Geocoder
//!
//! Remote first, local second: one Nominatim call, then (only if that gave
//! nothing) one lookup in the local place repository.

use crate::nominatim::NominatimClient;
use placemark_core::{Error, GeoPoint, PlaceRepository, ReverseGeocodeResult};
use std::sync::Arc;
use tracing::debug;

pub struct HybridGeocoder {
    remote: NominatimClient,
    local: Option<Arc<dyn PlaceRepository>>,
}

impl HybridGeocoder {
    #[must_use]
    pub fn new(remote: NominatimClient, local: Option<Arc<dyn PlaceRepository>>) -> Self {
        Self { remote, local }
    }

    #[must_use]
    pub fn remote(&self) -> &NominatimClient {
        &self.remote
    }

    #[must_use]
    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Resolve `point`, falling back to the local repository.
    ///
    /// Remote failures never surface here; local storage failures do.
    pub async fn reverse_geocode(
        &self,
        point: &GeoPoint,
    ) -> Result<Option<ReverseGeocodeResult>, Error> {
        if let Some(result) = self.remote.reverse_geocode(point).await {
            return Ok(Some(result));
        }
        self.reverse_geocode_local(point).await
    }

    /// Local repository only.
    pub async fn reverse_geocode_local(
        &self,
        point: &GeoPoint,
    ) -> Result<Option<ReverseGeocodeResult>, Error> {
        let Some(local) = self.local.clone() else {
            debug!(%point, "No local place repository configured");
            return Ok(None);
        };

        let point = *point;
        let result = tokio::task::spawn_blocking(move || local.reverse_geocode(&point))
            .await
            .map_err(|e| Error::Storage(format!("Local lookup task failed: {}", e)))??;

        debug!(%point, found = result.is_some(), "Local place lookup");
        Ok(result)
    }
}

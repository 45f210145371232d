//! # Nominatim Client
//!
//! One outbound reverse-geocoding call per lookup.
//!
//! Every failure (rate-limit wait over the timeout, transport, HTTP status,
//! unparseable body, provider error, too-coarse match) is logged and turned into `None`, so the caller can fall
//! back to the local repository. Nothing here returns an error to the caller.

use crate::config::NominatimConfig;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use placemark_core::{
    Error, GeoPoint, MIN_PLACE_RANK, Outcome, ReverseGeocodeResult, map_place, parse_response,
};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use tracing::{debug, error, warn};

/// Why the HTTP exchange itself failed.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("rate limit wait exceeded {0:?}")]
    RateLimited(std::time::Duration),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Rate-limited client for a Nominatim-compatible `/reverse` endpoint.
pub struct NominatimClient {
    config: NominatimConfig,
    http: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        let limiter = RateLimiter::direct(Quota::per_second(config.requests_per_second));
        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// True when an endpoint URL is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.reverse_url().is_some()
    }

    /// Reverse geocode `point`. Returns `None` on any failure.
    pub async fn reverse_geocode(&self, point: &GeoPoint) -> Option<ReverseGeocodeResult> {
        let url = self.config.reverse_url()?;
        debug!(%url, %point, format = %self.config.format, "Querying Nominatim");

        let body = match self.fetch(&url, point).await {
            Ok(body) => body,
            Err(FetchError::RateLimited(waited)) => {
                warn!(
                    "Nominatim rate limit not cleared within {:?} for {}; skipping remote lookup",
                    waited, point
                );
                return None;
            }
            Err(FetchError::Status(status)) => {
                warn!("Nominatim returned status {} for {}", status, point);
                return None;
            }
            Err(FetchError::Transport(e)) => {
                error!("Error querying Nominatim for {}: {}", point, e);
                return None;
            }
        };

        let place = match parse_response(&body) {
            Ok(place) => place,
            Err(e) => {
                warn!("Failed to parse Nominatim response for {}: {}", point, e);
                return None;
            }
        };

        match map_place(&place) {
            Outcome::Resolved(result) => {
                debug!(%point, ?result, "Nominatim resolved place");
                Some(result)
            }
            Outcome::ProviderError(message) => {
                warn!(
                    "Nominatim returned an error or no result for {}: {}",
                    point, message
                );
                None
            }
            Outcome::TooCoarse(rank) => {
                debug!(
                    "Nominatim result for {} has place_rank {}, which is below the minimum of {}; skipping",
                    point, rank, MIN_PLACE_RANK
                );
                None
            }
        }
    }

    async fn fetch(&self, url: &str, point: &GeoPoint) -> Result<String, FetchError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.limiter.until_ready())
            .await
            .map_err(|_| FetchError::RateLimited(timeout))?;

        let response = self
            .http
            .get(url)
            .query(&[("lat", point.latitude), ("lon", point.longitude)])
            .query(self.config.format.query_params())
            .header(ACCEPT, self.config.format.accept())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }
}

//! # Configuration
//!
//! Typed runtime settings for the Nominatim client and the HTTP server.
//! Values come from CLI flags and environment variables (see [`crate::cli`]).

use placemark_core::ResponseFormat;
use std::num::NonZeroU32;
use std::time::Duration;

/// Per-request timeout for Nominatim calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Outbound requests per second (public Nominatim usage policy).
pub const DEFAULT_RATE_LIMIT: u32 = 1;

/// `EnvFilter` directives used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,placemark=info,hyper=warn,reqwest=warn";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// `User-Agent` sent to Nominatim. Public instances reject anonymous clients.
#[must_use]
pub fn default_user_agent() -> String {
    format!("placemark/{}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// NOMINATIM
// =============================================================================

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance. `None` disables remote lookups.
    pub url: Option<String>,
    pub format: ResponseFormat,
    pub timeout: Duration,
    pub user_agent: String,
    pub requests_per_second: NonZeroU32,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: None,
            format: ResponseFormat::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            requests_per_second: NonZeroU32::new(DEFAULT_RATE_LIMIT).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl NominatimConfig {
    /// Default settings pointed at `url`.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Full `/reverse` endpoint, or `None` when no (non-blank) URL is set.
    ///
    /// A base that already ends in `/reverse` is used as is.
    #[must_use]
    pub fn reverse_url(&self) -> Option<String> {
        let base = self.url.as_deref()?.trim().trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        if base.ends_with("/reverse") {
            Some(base.to_string())
        } else {
            Some(format!("{}/reverse", base))
        }
    }
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on every route except `/health`.
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

//! # Formats Module
//!
//! Provider response parsing for Nominatim-compatible endpoints.
//!
//! Two wire formats are understood:
//! - `jsonv2` objects ([`parse_json`])
//! - `<reversegeocode>` XML documents ([`parse_xml`])
//!
//! Both produce a [`Place`]. [`parse_response`] picks the parser by looking
//! at the body, so a misconfigured format on the server side still works.
//!
//! Note: HTTP lives in the app layer (apps/placemark). This module only
//! handles format conversion (pure transformations).

mod json;
mod xml;

pub use json::parse_json;
pub use xml::parse_xml;

use crate::{Address, Error};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// PLACE
// =============================================================================

/// A provider's answer to a reverse-geocoding query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub place_id: Option<String>,
    pub display_name: Option<String>,
    /// Granularity of the match (30 = building, 4 = country).
    pub place_rank: Option<i64>,
    pub address: Address,
    /// Provider-reported error, e.g. `"Unable to geocode"`.
    pub error: Option<String>,
}

impl Place {
    /// True when the provider actually returned a place.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.place_id.is_some() || self.display_name.is_some() || !self.address.is_empty()
    }
}

/// Leading-integer parse of a rank string: `"30"` → 30, `"12abc"` → 12.
pub(crate) fn parse_rank(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { value.saturating_neg() } else { value })
}

// =============================================================================
// RESPONSE FORMAT
// =============================================================================

/// Wire format requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    /// Query parameters selecting this format with full address details.
    #[must_use]
    pub fn query_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Json => &[
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("namedetails", "1"),
                ("zoom", "18"),
            ],
            Self::Xml => &[("format", "xml"), ("addressdetails", "1"), ("zoom", "18")],
        }
    }

    /// Value for the `Accept` request header.
    #[must_use]
    pub fn accept(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "jsonv2" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(Error::Config(format!(
                "Unknown response format '{}' (expected json or xml)",
                other
            ))),
        }
    }
}

/// Parse a provider body, choosing XML or JSON from its first byte.
pub fn parse_response(body: &str) -> Result<Place, Error> {
    if body.trim_start().starts_with('<') {
        parse_xml(body)
    } else {
        parse_json(body)
    }
}

//! Nominatim `jsonv2` reverse response.

use super::{Place, parse_rank};
use crate::{Address, Error};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct RawPlace {
    #[serde(default)]
    place_id: Option<Value>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    place_rank: Option<Value>,
    #[serde(default)]
    address: BTreeMap<String, Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Parse a `jsonv2` body. A literal `null` is an empty answer.
pub fn parse_json(body: &str) -> Result<Place, Error> {
    let raw: Option<RawPlace> =
        serde_json::from_str(body).map_err(|e| Error::Parse(format!("invalid JSON: {}", e)))?;
    let Some(raw) = raw else {
        return Ok(Place::default());
    };

    // Non-string address values (nested objects from extensions) carry no
    // usable name.
    let address: Address = raw
        .address
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect();

    Ok(Place {
        place_id: raw.place_id.and_then(scalar_to_string),
        display_name: raw.display_name,
        place_rank: raw.place_rank.as_ref().and_then(rank_from_value),
        address,
        error: raw.error.map(error_message),
    })
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn rank_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_rank(s),
        _ => None,
    }
}

/// Nominatim reports errors either as a bare string or as
/// `{"code": 400, "message": "..."}`.
fn error_message(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Object(ref map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

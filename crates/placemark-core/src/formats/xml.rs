//! Nominatim `format=xml` reverse response.
//!
//! ```text
//! <reversegeocode timestamp="..." querystring="...">
//!   <result place_id="..." place_rank="30" ...>Display name</result>
//!   <addressparts>
//!     <road>Tunnel Pont Cadre</road>
//!     <postcode>98020</postcode>
//!     ...
//!   </addressparts>
//! </reversegeocode>
//! ```
//!
//! or, when nothing is found, `<reversegeocode><error>...</error></reversegeocode>`.

use super::{Place, parse_rank};
use crate::Error;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt;

/// Text currently being collected.
enum Capture {
    DisplayName,
    Error,
    Field(String),
}

fn xml_error(e: impl fmt::Display) -> Error {
    Error::Parse(format!("invalid XML: {}", e))
}

/// Parse a `<reversegeocode>` document.
///
/// A document that ends with elements still open (a truncated body) is an
/// [`Error::Parse`].
pub fn parse_xml(body: &str) -> Result<Place, Error> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut place = Place::default();
    let mut in_addressparts = false;
    let mut capture: Option<Capture> = None;
    let mut text = String::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) => {
                depth += 1;
                saw_root = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                text.clear();
                capture = match name.as_str() {
                    "result" => {
                        read_result_attributes(e, &mut place)?;
                        Some(Capture::DisplayName)
                    }
                    "addressparts" => {
                        in_addressparts = true;
                        None
                    }
                    "error" => Some(Capture::Error),
                    _ if in_addressparts => Some(Capture::Field(name)),
                    _ => None,
                };
            }
            Event::Empty(ref e) => {
                saw_root = true;
                if e.name().as_ref() == b"result" {
                    read_result_attributes(e, &mut place)?;
                }
            }
            Event::Text(ref e) => {
                if capture.is_some() {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(e) => {
                if capture.is_some() {
                    let raw = e.into_inner();
                    text.push_str(std::str::from_utf8(&raw).map_err(xml_error)?);
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"addressparts" {
                    in_addressparts = false;
                }
                if let Some(done) = capture.take() {
                    let value = std::mem::take(&mut text);
                    match done {
                        Capture::DisplayName => {
                            if !value.is_empty() {
                                place.display_name = Some(value);
                            }
                        }
                        Capture::Error => place.error = Some(value),
                        Capture::Field(key) => place.address.insert(key, value),
                    }
                }
            }
            Event::Eof => {
                if depth > 0 {
                    return Err(Error::Parse(format!(
                        "unexpected end of XML document with {} unclosed element(s)",
                        depth
                    )));
                }
                if !saw_root {
                    return Err(Error::Parse("XML document has no root element".to_string()));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(place)
}

fn read_result_attributes(e: &BytesStart<'_>, place: &mut Place) -> Result<(), Error> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        match attr.key.as_ref() {
            b"place_id" => place.place_id = Some(value.into_owned()),
            b"place_rank" => place.place_rank = parse_rank(&value),
            _ => {}
        }
    }
    Ok(())
}

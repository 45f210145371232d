//! # Placemark Library
//!
//! This library exposes the Placemark modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;
pub mod geocoder;
pub mod nominatim;

// Re-export placemark_core for convenience
pub use placemark_core;

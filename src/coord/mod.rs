//! Geographic coordinates
//!
//! This module handles:
//! - The `Coordinates` value carried through a resolution
//! - Parsing and validating user-supplied latitude/longitude
//! - Cache key normalization (see [`normalize`])

pub mod normalize;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse coordinates from raw request parameters
    ///
    /// Surrounding whitespace is ignored. Only the number syntax is checked
    /// here; call [`Coordinates::validate`] for finiteness and ranges.
    pub fn parse(lat: &str, lon: &str) -> Result<Self> {
        let lat: f64 = lat.trim().parse().map_err(|_| {
            Error::InvalidCoordinates(format!("Latitude '{}' is not a number", lat))
        })?;
        let lon: f64 = lon.trim().parse().map_err(|_| {
            Error::InvalidCoordinates(format!("Longitude '{}' is not a number", lon))
        })?;

        Ok(Self::new(lat, lon))
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "Coordinates ({}, {}) must be finite numbers",
                self.lat, self.lon
            )));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if self.lon < -180.0 || self.lon > 180.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Cache key for these coordinates at the given precision
    pub fn cache_key(&self, precision: u32) -> String {
        normalize::key_for_with_precision(self.lat, self.lon, precision)
    }
}

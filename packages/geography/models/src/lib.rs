#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference city types.
//!
//! A [`GeoPoint`] is one named placemark from the bundled geography file.
//! Points are loaded once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A named reference point (city or region marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Placemark name (e.g. "Lagos").
    pub name: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Look-at camera range in meters, as carried by the placemark.
    pub range: f64,
}

impl GeoPoint {
    /// Creates a point with a zero look-at range.
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            range: 0.0,
        }
    }

    /// Whether this point may be returned as a resolved city.
    ///
    /// Region and administrative markers share the file with cities; they
    /// are told apart by containing non-alphabetic characters
    /// ("Lagos State", "FCT-Abuja").
    #[must_use]
    pub fn is_city(&self) -> bool {
        !self.name.is_empty() && self.name.chars().all(char::is_alphabetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_cities() {
        assert!(GeoPoint::new("Lagos", 6.5244, 3.3792).is_city());
        assert!(GeoPoint::new("Oshogbo", 7.77, 4.56).is_city());
    }

    #[test]
    fn region_markers_are_not_cities() {
        assert!(!GeoPoint::new("Lagos State", 6.5, 3.4).is_city());
        assert!(!GeoPoint::new("FCT-Abuja", 9.0, 7.4).is_city());
        assert!(!GeoPoint::new("Zone 2", 9.0, 7.4).is_city());
        assert!(!GeoPoint::new("", 0.0, 0.0).is_city());
    }
}

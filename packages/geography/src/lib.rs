#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference city index for nearest-city resolution.
//!
//! Loads named placemarks from the bundled `Cities.kml` file once at
//! startup and resolves arbitrary coordinates to the closest city by
//! great-circle distance. The city set is small (tens to low hundreds of
//! entries), so lookups are a linear scan rather than a spatial tree.

pub mod kml;

use std::collections::BTreeSet;
use std::path::Path;

use geo::Point;
use kintr_geography_models::GeoPoint;
use thiserror::Error;

/// Mean Earth radius used for haversine distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors raised while reading the geography reference file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read geography file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not well-formed XML.
    #[error("Malformed geography file: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A placemark is structurally invalid.
    #[error("Invalid placemark #{index}: {message}")]
    Placemark {
        /// Zero-based position of the placemark in the document.
        index: usize,
        /// Description of what is wrong.
        message: String,
    },
}

/// Errors from geography operations.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// Reference data could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// No eligible reference cities are loaded.
    #[error("No reference cities available for nearest-city lookup")]
    EmptyIndex,
}

/// An eligible city with its precomputed location.
#[derive(Debug, Clone)]
struct CityEntry {
    location: Point<f64>,
    point: usize,
}

/// Immutable set of reference points, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    points: Vec<GeoPoint>,
    cities: Vec<CityEntry>,
}

impl GeoIndex {
    /// Loads the index from a KML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::Load`] if the file is missing, unreadable
    /// or structurally invalid.
    pub fn load(path: &Path) -> Result<Self, GeographyError> {
        let xml = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let index = Self::from_kml_str(&xml)?;
        log::info!(
            "Loaded {} reference points ({} cities) from {}",
            index.points.len(),
            index.cities.len(),
            path.display()
        );
        Ok(index)
    }

    /// Parses the index from KML text.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::Load`] if the KML is invalid.
    pub fn from_kml_str(xml: &str) -> Result<Self, GeographyError> {
        Ok(Self::from_points(kml::parse_placemarks(xml)?))
    }

    /// Builds an index from already-known points, keeping load order.
    ///
    /// A repeated name keeps its first occurrence.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        let mut seen = BTreeSet::new();
        let mut index = Self::default();

        for point in points {
            if !seen.insert(point.name.clone()) {
                log::warn!("Duplicate reference point '{}' ignored", point.name);
                continue;
            }
            if point.is_city() {
                index.cities.push(CityEntry {
                    location: Point::new(point.longitude, point.latitude),
                    point: index.points.len(),
                });
            }
            index.points.push(point);
        }

        index
    }

    /// All loaded points, cities and region markers alike.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Points eligible as nearest-city results, in load order.
    pub fn cities(&self) -> impl Iterator<Item = &GeoPoint> {
        self.cities.iter().map(|c| &self.points[c.point])
    }

    /// Number of eligible cities.
    #[must_use]
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Returns the eligible city closest to `(latitude, longitude)`.
    ///
    /// Ties resolve to the city loaded first.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::EmptyIndex`] if no cities are loaded.
    pub fn nearest_to(&self, latitude: f64, longitude: f64) -> Result<&GeoPoint, GeographyError> {
        let query = Point::new(longitude, latitude);
        let mut best: Option<(&CityEntry, f64)> = None;

        for entry in &self.cities {
            let distance = haversine_km(query, entry.location);
            match best {
                Some((_, min)) if distance >= min => {}
                _ => best = Some((entry, distance)),
            }
        }

        best.map(|(entry, _)| &self.points[entry.point])
            .ok_or(GeographyError::EmptyIndex)
    }

    /// Name of the eligible city closest to `(latitude, longitude)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::EmptyIndex`] if no cities are loaded.
    pub fn nearest_name(&self, latitude: f64, longitude: f64) -> Result<&str, GeographyError> {
        self.nearest_to(latitude, longitude).map(|p| p.name.as_str())
    }
}

/// Great-circle distance between two `(lon, lat)` points in kilometers.
#[must_use]
pub fn haversine_km(from: Point<f64>, to: Point<f64>) -> f64 {
    let phi1 = from.y().to_radians();
    let phi2 = to.y().to_radians();
    let delta_phi = (to.y() - from.y()).to_radians();
    let delta_lambda = (to.x() - from.x()).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nigeria() -> GeoIndex {
        GeoIndex::from_points([
            GeoPoint::new("Lagos", 6.5244, 3.3792),
            GeoPoint::new("Abuja", 9.0765, 7.3986),
        ])
    }

    #[test]
    fn resolves_lagos() {
        assert_eq!(nigeria().nearest_name(6.5, 3.4).unwrap(), "Lagos");
    }

    #[test]
    fn resolves_abuja() {
        assert_eq!(nigeria().nearest_name(9.1, 7.5).unwrap(), "Abuja");
    }

    #[test]
    fn nearest_is_minimal_and_deterministic() {
        let index = GeoIndex::from_points([
            GeoPoint::new("Lagos", 6.5244, 3.3792),
            GeoPoint::new("Abuja", 9.0765, 7.3986),
            GeoPoint::new("Kano", 12.0022, 8.5920),
            GeoPoint::new("Enugu", 6.4584, 7.5464),
            GeoPoint::new("Calabar", 4.9757, 8.3417),
        ]);

        for (lat, lon) in [(7.0, 5.0), (11.0, 8.0), (5.5, 8.0), (-33.9, 151.2), (0.0, 0.0)] {
            let found = index.nearest_to(lat, lon).unwrap();
            let query = Point::new(lon, lat);
            let found_km = haversine_km(query, Point::new(found.longitude, found.latitude));
            for city in index.cities() {
                let km = haversine_km(query, Point::new(city.longitude, city.latitude));
                assert!(found_km <= km + 1e-9, "{} beat {}", city.name, found.name);
            }
            assert_eq!(index.nearest_name(lat, lon).unwrap(), found.name);
        }
    }

    #[test]
    fn ties_go_to_first_loaded() {
        let index = GeoIndex::from_points([
            GeoPoint::new("West", 0.0, -1.0),
            GeoPoint::new("East", 0.0, 1.0),
        ]);
        assert_eq!(index.nearest_name(0.0, 0.0).unwrap(), "West");
    }

    #[test]
    fn region_markers_are_never_returned() {
        let index = GeoIndex::from_points([
            GeoPoint::new("Lagos State", 6.5, 3.4),
            GeoPoint::new("Abuja", 9.0765, 7.3986),
        ]);
        assert_eq!(index.points().len(), 2);
        assert_eq!(index.city_count(), 1);
        assert_eq!(index.nearest_name(6.5, 3.4).unwrap(), "Abuja");
    }

    #[test]
    fn empty_index_fails() {
        let index = GeoIndex::from_points([GeoPoint::new("Zone 1", 1.0, 1.0)]);
        assert!(matches!(
            index.nearest_to(1.0, 1.0),
            Err(GeographyError::EmptyIndex)
        ));
    }

    #[test]
    fn duplicate_names_keep_first() {
        let index = GeoIndex::from_points([
            GeoPoint::new("Lagos", 6.5244, 3.3792),
            GeoPoint::new("Lagos", 50.0, 50.0),
        ]);
        assert_eq!(index.points().len(), 1);
        assert!((index.points()[0].latitude - 6.5244).abs() < f64::EPSILON);
    }

    #[test]
    fn haversine_known_distance() {
        // Lagos to Abuja is roughly 525 km.
        let km = haversine_km(Point::new(3.3792, 6.5244), Point::new(7.3986, 9.0765));
        assert!((km - 525.0).abs() < 10.0, "got {km}");
        assert!(haversine_km(Point::new(3.0, 6.0), Point::new(3.0, 6.0)).abs() < 1e-12);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = GeoIndex::load(Path::new("/nonexistent/Cities.kml")).unwrap_err();
        assert!(matches!(err, GeographyError::Load(LoadError::Read { .. })));
    }

    #[test]
    fn loads_bundled_cities() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/Cities.kml");
        let index = GeoIndex::load(&path).unwrap();
        assert!(index.city_count() > 0);
        assert!(index.cities().all(GeoPoint::is_city));
        assert_eq!(index.nearest_name(6.5, 3.4).unwrap(), "Lagos");
    }
}

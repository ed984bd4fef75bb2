// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carnival landmark loading and nearest-area classification.

use geo::Point;
use geojson::GeoJson;
use std::fs;
use std::path::Path;

/// Area label returned when no landmark matches.
pub const FALLBACK_AREA: &str = "Nearby Area";

/// Landmark radius when the data file omits one (degrees).
const DEFAULT_RADIUS_DEG: f64 = 0.01;

/// A named carnival landmark with a match radius.
#[derive(Debug, Clone)]
pub struct Landmark {
    /// Area name (e.g., "Ladbroke Grove Station")
    pub name: String,
    /// Landmark center (lon/lat)
    pub center: Point<f64>,
    /// Match radius in raw degrees
    pub radius_deg: f64,
}

impl Landmark {
    /// Whether a lat/lon point falls inside this landmark's radius.
    ///
    /// Distance is Euclidean in degree space, not geodesic.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let dx = longitude - self.center.x();
        let dy = latitude - self.center.y();
        dx.hypot(dy) <= self.radius_deg
    }
}

/// Service for classifying coordinates into named carnival areas.
#[derive(Default, Clone)]
pub struct Gazetteer {
    landmarks: Vec<Landmark>,
}

impl Gazetteer {
    /// Load landmarks from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| GazetteerError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load landmarks from a GeoJSON string.
    ///
    /// Expects a FeatureCollection of Point features carrying `name` and
    /// optionally `radius_deg` properties. Unnamed features are skipped.
    pub fn load_from_json(json_data: &str) -> Result<Self, GazetteerError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| GazetteerError::ParseError(e.to_string()))?;

        let mut landmarks = Vec::new();

        if let GeoJson::FeatureCollection(collection) = geojson {
            for feature in collection.features {
                let Some(name) = feature
                    .property("name")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                else {
                    continue;
                };

                let radius_deg = feature
                    .property("radius_deg")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(DEFAULT_RADIUS_DEG);

                let Some(geom) = feature.geometry else {
                    continue;
                };

                match geom.value {
                    geojson::Value::Point(position) if position.len() >= 2 => {
                        landmarks.push(Landmark {
                            name,
                            center: Point::new(position[0], position[1]),
                            radius_deg,
                        });
                    }
                    _ => return Err(GazetteerError::UnsupportedGeometry),
                }
            }
        }

        tracing::info!(count = landmarks.len(), "Loaded carnival landmarks");
        Ok(Self { landmarks })
    }

    /// Get the list of landmarks.
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Classify a coordinate into a named area.
    ///
    /// First landmark in file order whose radius contains the point wins;
    /// matching is stable, not distance-sorted. Falls back to
    /// [`FALLBACK_AREA`] when nothing matches.
    pub fn resolve_area(&self, latitude: f64, longitude: f64) -> &str {
        self.landmarks
            .iter()
            .find(|lm| lm.contains(latitude, longitude))
            .map(|lm| lm.name.as_str())
            .unwrap_or(FALLBACK_AREA)
    }
}

/// Errors from gazetteer loading.
#[derive(Debug, thiserror::Error)]
pub enum GazetteerError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,
}

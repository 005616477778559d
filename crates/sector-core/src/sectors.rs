//! Sector index built from the sector GeoJSON feed.
//!
//! Sectors keep feed declaration order. When polygons overlap, the first
//! sector in that order whose polygon and altitude band both contain the
//! point is the match.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Assignment;
use crate::spatial::Polygon;

#[derive(Debug, Error)]
pub enum SectorFeedError {
    #[error("sector feed has no `features` array")]
    MissingFeatures,
}

/// A named airspace region with an altitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    /// Empty when the feed gives no specialty
    pub specialty: String,
    pub polygon: Polygon,
    /// Inclusive, feet. `None` is unbounded.
    pub floor_ft: Option<f64>,
    /// Exclusive, feet. `None` is unbounded.
    pub ceiling_ft: Option<f64>,
}

impl Sector {
    pub fn new(id: impl Into<String>, specialty: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            specialty: specialty.into(),
            polygon,
            floor_ft: None,
            ceiling_ft: None,
        }
    }

    pub fn with_band(mut self, floor_ft: Option<f64>, ceiling_ft: Option<f64>) -> Self {
        self.floor_ft = floor_ft;
        self.ceiling_ft = ceiling_ft;
        self
    }

    /// An unknown altitude is never inside a band.
    pub fn altitude_in_band(&self, altitude_ft: Option<f64>) -> bool {
        let Some(alt) = altitude_ft.filter(|a| a.is_finite()) else {
            return false;
        };
        let floor = self.floor_ft.unwrap_or(f64::NEG_INFINITY);
        let ceiling = self.ceiling_ft.unwrap_or(f64::INFINITY);
        alt >= floor && alt < ceiling
    }

    pub fn contains(&self, lon: f64, lat: f64, altitude_ft: Option<f64>) -> bool {
        self.polygon.contains(lon, lat) && self.altitude_in_band(altitude_ft)
    }

    pub fn assignment(&self) -> Assignment {
        Assignment::Assigned {
            sector: self.id.clone(),
            specialty: self.specialty.clone(),
        }
    }
}

/// Per-cycle lookup structure over the sector feed.
#[derive(Debug, Clone)]
pub struct SectorIndex {
    sectors: Vec<Sector>,
    perimeter_designator: String,
}

impl SectorIndex {
    pub fn new(sectors: Vec<Sector>, perimeter_designator: impl Into<String>) -> Self {
        Self {
            sectors,
            perimeter_designator: perimeter_designator.into(),
        }
    }

    /// Parse a GeoJSON-like feature collection.
    ///
    /// Features without a string `properties.sector` are skipped. Features
    /// with missing or degenerate geometry are kept but never match.
    pub fn from_geojson(
        payload: &Value,
        perimeter_designator: impl Into<String>,
    ) -> Result<Self, SectorFeedError> {
        let features = payload
            .get("features")
            .and_then(Value::as_array)
            .ok_or(SectorFeedError::MissingFeatures)?;

        let mut sectors = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            match parse_feature(feature) {
                Some(sector) => {
                    if !sector.polygon.is_valid() {
                        tracing::debug!("Sector {} has no usable polygon", sector.id);
                    }
                    sectors.push(sector);
                }
                None => tracing::debug!("Skipping sector feature #{} without an id", idx),
            }
        }

        Ok(Self::new(sectors, perimeter_designator))
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn is_perimeter(&self, sector: &Sector) -> bool {
        sector.id.eq_ignore_ascii_case(&self.perimeter_designator)
    }

    /// First sector in feed order containing the point at this altitude.
    pub fn find_containing_sector(
        &self,
        lon: f64,
        lat: f64,
        altitude_ft: Option<f64>,
        exclude_perimeter: bool,
    ) -> Option<&Sector> {
        self.sectors
            .iter()
            .filter(|s| !(exclude_perimeter && self.is_perimeter(s)))
            .find(|s| s.contains(lon, lat, altitude_ft))
    }

    /// Concrete-sector assignment for a point; the perimeter never matches.
    pub fn resolve(&self, lon: f64, lat: f64, altitude_ft: Option<f64>) -> Assignment {
        self.find_containing_sector(lon, lat, altitude_ft, true)
            .map(Sector::assignment)
            .unwrap_or(Assignment::Unassigned)
    }

    /// Boundary of the reserved perimeter region, if the feed defines a usable one.
    pub fn perimeter_polygon(&self) -> Option<&Polygon> {
        self.sectors
            .iter()
            .find(|s| self.is_perimeter(s))
            .map(|s| &s.polygon)
            .filter(|p| p.is_valid())
    }

    /// Distinct non-empty specialty labels, sorted.
    pub fn all_specialties(&self) -> BTreeSet<String> {
        self.sectors
            .iter()
            .filter(|s| !s.specialty.trim().is_empty())
            .map(|s| s.specialty.clone())
            .collect()
    }
}

fn parse_feature(feature: &Value) -> Option<Sector> {
    let properties = feature.get("properties")?;
    let id = properties.get("sector")?.as_str()?.to_string();
    let specialty = properties
        .get("specialty")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let polygon = feature
        .get("geometry")
        .map(outer_ring)
        .map(Polygon::new)
        .unwrap_or_default();

    Some(Sector {
        id,
        specialty,
        polygon,
        floor_ft: properties.get("floor").and_then(numeric),
        ceiling_ft: properties.get("ceiling").and_then(numeric),
    })
}

/// First ring of the first polygon. Holes and extra polygons are ignored.
fn outer_ring(geometry: &Value) -> Vec<[f64; 2]> {
    let Some(coordinates) = geometry.get("coordinates") else {
        return Vec::new();
    };
    let ring = match geometry.get("type").and_then(Value::as_str) {
        Some("MultiPolygon") => coordinates.get(0).and_then(|poly| poly.get(0)),
        _ => coordinates.get(0),
    };
    let Some(points) = ring.and_then(Value::as_array) else {
        return Vec::new();
    };

    let vertices: Option<Vec<[f64; 2]>> = points
        .iter()
        .map(|point| {
            let lon = point.get(0)?.as_f64()?;
            let lat = point.get(1)?.as_f64()?;
            Some([lon, lat])
        })
        .collect();

    // A single malformed vertex makes the whole ring unusable.
    vertices.unwrap_or_default()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

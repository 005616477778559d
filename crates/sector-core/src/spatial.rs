//! Spatial math for sector containment, proximity and dead reckoning.
//!
//! Coordinates are decimal degrees on a spherical earth. Polygon vertices are
//! stored `[lon, lat]`, the GeoJSON order, while point arguments are passed
//! latitude first unless a function says otherwise.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers, used for forward projection.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Mean earth radius in nautical miles, used for distances.
pub const EARTH_RADIUS_NM: f64 = 3440.065;
pub const KM_PER_NM: f64 = 1.852;

/// Added to the edge slope denominator so horizontal edges never divide by zero.
const RAY_CAST_EPSILON: f64 = 1e-12;
/// Samples per polygon edge for boundary distance (t = 0.0, 0.1, ..., 1.0).
const EDGE_SAMPLES: usize = 11;

/// Ordered, implicitly closed ring of `[lon, lat]` vertices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// A region needs at least three vertices; anything less never matches.
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.is_valid() && point_in_polygon(lon, lat, &self.vertices)
    }
}

/// Ray-casting parity test. `polygon` holds `[lon, lat]` pairs.
pub fn point_in_polygon(lon: f64, lat: f64, polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n == 0 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = polygon[i];
        let [xj, yj] = polygon[j];

        if ((yi > lat) != (yj > lat))
            && (lon < (xj - xi) * (lat - yi) / (yj - yi + RAY_CAST_EPSILON) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Great-circle distance in nautical miles (Haversine).
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_NM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2 in degrees, `[0, 360)`.
pub fn bearing_to(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_degrees(x.atan2(y).to_degrees())
}

/// Absolute angular difference between two directions, `[0, 180]`.
pub fn heading_difference(heading_deg: f64, bearing_deg: f64) -> f64 {
    ((heading_deg - bearing_deg + 540.0).rem_euclid(360.0) - 180.0).abs()
}

fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round a tiny negative input up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Dead-reckon a position along a constant great-circle heading.
///
/// Distance is `groundspeed_kt * 1.852 * minutes / 60` kilometers. A zero or
/// non-finite distance, or a non-finite heading, returns the input position.
///
/// # Returns
/// (lat, lon) in degrees
pub fn project_position(
    lat: f64,
    lon: f64,
    heading_deg: f64,
    groundspeed_kt: f64,
    minutes: f64,
) -> (f64, f64) {
    let distance_km = groundspeed_kt * KM_PER_NM * (minutes / 60.0);
    if !distance_km.is_finite() || distance_km.abs() <= f64::EPSILON || !heading_deg.is_finite() {
        return (lat, lon);
    }
    offset_by_bearing(lat, lon, distance_km, heading_deg.to_radians())
}

/// Offset a position by distance (km) and bearing (radians, 0 = north).
fn offset_by_bearing(lat: f64, lon: f64, distance_km: f64, bearing_rad: f64) -> (f64, f64) {
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_km / EARTH_RADIUS_KM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Approximate distance (NM) from a point to a polygon boundary.
///
/// Each edge, including the closing edge, is sampled at eleven evenly spaced
/// points and the smallest Haversine distance wins. Returns `None` for an
/// empty polygon.
pub fn min_distance_to_polygon(lat: f64, lon: f64, polygon: &[[f64; 2]]) -> Option<f64> {
    let n = polygon.len();
    if n == 0 {
        return None;
    }

    let mut min_dist = f64::INFINITY;
    for i in 0..n {
        let [lon1, lat1] = polygon[i];
        let [lon2, lat2] = polygon[(i + 1) % n];
        for step in 0..EDGE_SAMPLES {
            let t = step as f64 / (EDGE_SAMPLES - 1) as f64;
            let lat_edge = lat1 + t * (lat2 - lat1);
            let lon_edge = lon1 + t * (lon2 - lon1);
            min_dist = min_dist.min(haversine_distance_nm(lat, lon, lat_edge, lon_edge));
        }
    }

    Some(min_dist)
}

/// Nearest polygon vertex to a point, as `(lat, lon)`.
pub fn nearest_vertex(lat: f64, lon: f64, polygon: &[[f64; 2]]) -> Option<(f64, f64)> {
    polygon
        .iter()
        .map(|&[v_lon, v_lat]| (haversine_distance_nm(lat, lon, v_lat, v_lon), v_lat, v_lon))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, v_lat, v_lon)| (v_lat, v_lon))
}

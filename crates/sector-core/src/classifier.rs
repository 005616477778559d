//! Per-aircraft sector classification and admission.
//!
//! Each aircraft is evaluated independently:
//! 1. no position: dropped
//! 2. inside a concrete sector at its altitude: assigned
//! 3. otherwise, within the perimeter admission distance and heading toward
//!    the nearest perimeter vertex: admitted as near-perimeter traffic,
//!    pre-assigned to whatever sector lies one look-ahead distance ahead
//! 4. anything slower than the ground threshold is dropped last

use serde::{Deserialize, Serialize};

use crate::models::{AircraftRecord, Assignment, FlightPlanInfo};
use crate::rules::ClassifierRules;
use crate::sectors::SectorIndex;
use crate::spatial::{
    bearing_to, heading_difference, min_distance_to_polygon, nearest_vertex, project_position,
};

/// An admitted aircraft and its current-position assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude_ft: Option<f64>,
    pub heading_deg: Option<f64>,
    pub groundspeed_kt: f64,
    pub assignment: Assignment,
    pub near_perimeter: bool,
    pub flight_plan: Option<FlightPlanInfo>,
}

/// Stateless classifier bound to one cycle's sector index.
pub struct Classifier<'a> {
    index: &'a SectorIndex,
    rules: &'a ClassifierRules,
}

impl<'a> Classifier<'a> {
    pub fn new(index: &'a SectorIndex, rules: &'a ClassifierRules) -> Self {
        Self { index, rules }
    }

    /// Classify one aircraft. `None` means the aircraft is not admitted.
    pub fn classify(&self, record: &AircraftRecord) -> Option<Classification> {
        let (lat, lon) = record.position()?;
        let altitude_ft = record.altitude.filter(|a| a.is_finite());
        let heading_deg = record.heading.filter(|h| h.is_finite());

        let (assignment, near_perimeter) =
            match self.index.find_containing_sector(lon, lat, altitude_ft, true) {
                Some(sector) => (sector.assignment(), false),
                None => (
                    self.perimeter_admission(lat, lon, altitude_ft, heading_deg, record.groundspeed)?,
                    true,
                ),
            };

        let groundspeed_kt = record
            .groundspeed
            .filter(|gs| gs.is_finite() && *gs >= self.rules.min_groundspeed_kt)?;

        Some(Classification {
            callsign: record.callsign.clone(),
            lat,
            lon,
            altitude_ft,
            heading_deg,
            groundspeed_kt,
            assignment,
            near_perimeter,
            flight_plan: record.flight_plan.clone(),
        })
    }

    pub fn classify_all(&self, records: &[AircraftRecord]) -> Vec<Classification> {
        records.iter().filter_map(|r| self.classify(r)).collect()
    }

    /// Fallback admission for aircraft outside every concrete sector.
    fn perimeter_admission(
        &self,
        lat: f64,
        lon: f64,
        altitude_ft: Option<f64>,
        heading_deg: Option<f64>,
        groundspeed_kt: Option<f64>,
    ) -> Option<Assignment> {
        let perimeter = self.index.perimeter_polygon()?;
        let distance_nm = min_distance_to_polygon(lat, lon, perimeter.vertices())?;
        if distance_nm > self.rules.perimeter_admission_nm {
            return None;
        }

        let heading = heading_deg?;
        let (vertex_lat, vertex_lon) = nearest_vertex(lat, lon, perimeter.vertices())?;
        let bearing = bearing_to(lat, lon, vertex_lat, vertex_lon);
        if heading_difference(heading, bearing) > self.rules.heading_gate_deg {
            return None;
        }

        let Some(groundspeed) = groundspeed_kt.filter(|gs| gs.is_finite()) else {
            return Some(Assignment::Unassigned);
        };
        let minutes = if groundspeed > 0.0 {
            self.rules.lookahead_nm / groundspeed * 60.0
        } else {
            0.0
        };
        let (ahead_lat, ahead_lon) = project_position(lat, lon, heading, groundspeed, minutes);
        Some(self.index.resolve(ahead_lon, ahead_lat, altitude_ft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sectors::Sector;
    use crate::spatial::{haversine_distance_nm, Polygon};

    fn square(lon0: f64, lat0: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            [lon0, lat0],
            [lon0 + size, lat0],
            [lon0 + size, lat0 + size],
            [lon0, lat0 + size],
        ])
    }

    /// Perimeter spans lon -96..-94, lat 29..31 with an extra vertex at
    /// (-94, 30); sector "46" fills its west half and "47" its east half,
    /// both 0..24000 ft.
    fn index() -> SectorIndex {
        SectorIndex::new(
            vec![
                Sector::new(
                    "ZHU",
                    "",
                    Polygon::new(vec![
                        [-96.0, 29.0],
                        [-94.0, 29.0],
                        [-94.0, 30.0],
                        [-94.0, 31.0],
                        [-96.0, 31.0],
                    ]),
                ),
                Sector::new(
                    "46",
                    "LOW",
                    Polygon::new(vec![[-96.0, 29.0], [-95.0, 29.0], [-95.0, 31.0], [-96.0, 31.0]]),
                )
                .with_band(Some(0.0), Some(24000.0)),
                Sector::new(
                    "47",
                    "EAST",
                    Polygon::new(vec![[-95.0, 29.0], [-94.0, 29.0], [-94.0, 31.0], [-95.0, 31.0]]),
                )
                .with_band(Some(0.0), Some(24000.0)),
            ],
            "zhu",
        )
    }

    fn aircraft(lat: f64, lon: f64, alt: Option<f64>, hdg: Option<f64>, gs: Option<f64>) -> AircraftRecord {
        AircraftRecord {
            callsign: "TEST1".into(),
            latitude: Some(lat),
            longitude: Some(lon),
            altitude: alt,
            heading: hdg,
            groundspeed: gs,
            flight_plan: None,
        }
    }

    #[test]
    fn inside_sector_assigned_regardless_of_heading() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        for heading in [None, Some(0.0), Some(137.0), Some(270.0)] {
            let c = classifier
                .classify(&aircraft(29.5, -95.5, Some(12000.0), heading, Some(25.0)))
                .unwrap();
            assert_eq!(c.assignment.sector_id(), Some("46"));
            assert_eq!(c.assignment.specialty(), Some("LOW"));
            assert!(!c.near_perimeter);
        }
    }

    #[test]
    fn missing_position_dropped() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        let mut record = aircraft(29.5, -95.5, Some(12000.0), Some(90.0), Some(250.0));
        record.latitude = None;
        assert!(classifier.classify(&record).is_none());
    }

    #[test]
    fn slow_aircraft_inside_sector_dropped() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        assert!(classifier
            .classify(&aircraft(29.5, -95.5, Some(12000.0), Some(90.0), Some(15.0)))
            .is_none());
        assert!(classifier
            .classify(&aircraft(29.5, -95.5, Some(12000.0), Some(90.0), None))
            .is_none());
    }

    #[test]
    fn unknown_altitude_falls_through_to_perimeter_logic() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        // inside the perimeter near its north-west corner, heading at the corner
        let heading = bearing_to(30.9, -95.9, 31.0, -96.0);
        let c = classifier
            .classify(&aircraft(30.9, -95.9, None, Some(heading), Some(250.0)))
            .unwrap();
        assert!(c.near_perimeter);
        assert_eq!(c.assignment, Assignment::Unassigned);
    }

    #[test]
    fn sixty_nm_out_is_dropped() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        // due east of the (-94, 30) edge by ~60 NM
        let lon = -94.0 + 60.0 / (60.04 * 30.0_f64.to_radians().cos());
        let d = min_distance_to_polygon(30.0, lon, index.perimeter_polygon().unwrap().vertices())
            .unwrap();
        assert!(d > 55.0, "fixture distance {d}");
        for heading in [0.0, 90.0, 180.0, 270.0] {
            assert!(classifier
                .classify(&aircraft(30.0, lon, Some(30000.0), Some(heading), Some(450.0)))
                .is_none());
        }
    }

    #[test]
    fn heading_away_from_nearest_vertex_dropped() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        // ~30 NM northeast of the (-94, 31) corner
        let (lat, lon) = project_position(31.0, -94.0, 45.0, 30.0, 60.0);
        let d = haversine_distance_nm(lat, lon, 31.0, -94.0);
        assert!((d - 30.0).abs() < 0.5);
        let toward = bearing_to(lat, lon, 31.0, -94.0);
        let away = (toward + 180.0) % 360.0;
        assert!(classifier
            .classify(&aircraft(lat, lon, Some(30000.0), Some(away), Some(450.0)))
            .is_none());
        assert!(classifier
            .classify(&aircraft(lat, lon, Some(30000.0), None, Some(450.0)))
            .is_none());

        let c = classifier
            .classify(&aircraft(lat, lon, Some(30000.0), Some(toward), Some(450.0)))
            .unwrap();
        assert!(c.near_perimeter);
    }

    #[test]
    fn admission_distance_is_inclusive() {
        let index = index();
        let perimeter = index.perimeter_polygon().unwrap().vertices().to_vec();
        // due north of the (-94, 31) corner, heading straight at it
        let (lat, lon) = project_position(31.0, -94.0, 0.0, 50.0, 60.0);
        let d = min_distance_to_polygon(lat, lon, &perimeter).unwrap();
        assert!((d - 50.0).abs() < 0.01, "fixture distance {d}");
        let record = aircraft(lat, lon, Some(30000.0), Some(180.0), Some(450.0));

        let mut rules = ClassifierRules::default();
        rules.perimeter_admission_nm = d;
        let c = Classifier::new(&index, &rules).classify(&record).unwrap();
        assert!(c.near_perimeter);
        assert_eq!(c.assignment, Assignment::Unassigned);

        rules.perimeter_admission_nm = d - 1e-6;
        assert!(Classifier::new(&index, &rules).classify(&record).is_none());

        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        for (nm, admitted) in [(49.9, true), (50.1, false)] {
            let (lat, lon) = project_position(31.0, -94.0, 0.0, nm, 60.0);
            let result = classifier.classify(&aircraft(lat, lon, Some(30000.0), Some(180.0), Some(450.0)));
            assert_eq!(result.is_some(), admitted, "{nm} NM out");
        }
    }

    #[test]
    fn heading_gate_is_inclusive() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        // 30 NM north of the (-94, 31) corner, which lies due south
        let (lat, lon) = (31.5, -94.0);
        assert_eq!(bearing_to(lat, lon, 31.0, -94.0), 180.0);

        for (heading, admitted) in [
            (225.0, true),
            (135.0, true),
            (225.5, false),
            (134.5, false),
        ] {
            let result = classifier.classify(&aircraft(lat, lon, Some(30000.0), Some(heading), Some(450.0)));
            assert_eq!(result.is_some(), admitted, "heading {heading}");
        }
    }

    #[test]
    fn approaching_aircraft_preassigned_from_lookahead() {
        let index = index();
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        // 10 NM east of the (-94, 30) perimeter vertex, heading west at 20000 ft
        let (lat, lon) = project_position(30.0, -94.0, 90.0, 10.0, 60.0);
        let c = classifier
            .classify(&aircraft(lat, lon, Some(20000.0), Some(270.0), Some(300.0)))
            .unwrap();
        assert!(c.near_perimeter);
        assert_eq!(c.assignment.sector_id(), Some("47"));
        assert_eq!(c.assignment.specialty(), Some("EAST"));

        // same aircraft above every band: admitted but unassigned
        let c = classifier
            .classify(&aircraft(lat, lon, Some(35000.0), Some(270.0), Some(300.0)))
            .unwrap();
        assert!(c.near_perimeter);
        assert_eq!(c.assignment, Assignment::Unassigned);
    }

    #[test]
    fn no_perimeter_means_unassigned_aircraft_dropped() {
        let index = SectorIndex::new(
            vec![Sector::new("46", "LOW", square(-96.0, 29.0, 1.0))],
            "zhu",
        );
        let rules = ClassifierRules::default();
        let classifier = Classifier::new(&index, &rules);
        assert!(classifier
            .classify(&aircraft(40.0, -80.0, Some(30000.0), Some(0.0), Some(450.0)))
            .is_none());
    }
}

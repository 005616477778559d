//! One refresh cycle: classify, project and aggregate a traffic snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::groups::GroupConfig;
use crate::models::{Assignment, Controller, TrafficFeed};
use crate::projection::{project, ProjectedFlight, ProjectedPoint};
use crate::rules::{BandThresholds, ClassifierRules};
use crate::sectors::SectorIndex;
use crate::summary::{summarize_groups, summarize_specialties, SummaryRow};

const ALTITUDE_DISPLAY_STEP_FT: f64 = 500.0;

/// Inputs shared by every aircraft in one cycle.
pub struct CycleContext<'a> {
    pub sectors: &'a SectorIndex,
    pub groups: Option<&'a GroupConfig>,
    pub rules: &'a ClassifierRules,
    pub thresholds: &'a BandThresholds,
    pub controller_prefix: Option<&'a str>,
}

impl<'a> CycleContext<'a> {
    pub fn new(
        sectors: &'a SectorIndex,
        rules: &'a ClassifierRules,
        thresholds: &'a BandThresholds,
    ) -> Self {
        Self {
            sectors,
            groups: None,
            rules,
            thresholds,
            controller_prefix: None,
        }
    }

    pub fn with_groups(mut self, groups: Option<&'a GroupConfig>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_controller_prefix(mut self, prefix: &'a str) -> Self {
        self.controller_prefix = Some(prefix);
        self
    }

    /// Classified and projected aircraft, in feed order.
    pub fn project_all(&self, traffic: &TrafficFeed) -> Vec<ProjectedFlight> {
        Classifier::new(self.sectors, self.rules)
            .classify_all(&traffic.pilots)
            .into_iter()
            .map(|c| project(c, self.sectors))
            .collect()
    }

    pub fn run(&self, traffic: &TrafficFeed, generated_at: DateTime<Utc>) -> CycleReport {
        let flights = self.project_all(traffic);

        let specialty_summary =
            summarize_specialties(&flights, self.sectors, self.rules, self.thresholds);
        let group_summary = self
            .groups
            .map(|groups| summarize_groups(&flights, groups, self.rules, self.thresholds));

        let mut rows: Vec<FlightRow> = flights
            .iter()
            .map(|f| FlightRow::from_projected(f, self.rules))
            .collect();
        rows.sort_by_cached_key(|r| r.callsign.to_uppercase());

        let controllers = self
            .controller_prefix
            .map(|prefix| traffic.enroute_controllers(prefix))
            .unwrap_or_default();

        tracing::debug!(
            "Cycle admitted {} of {} aircraft",
            rows.len(),
            traffic.pilots.len()
        );

        CycleReport {
            generated_at,
            flights: rows,
            specialty_summary,
            group_summary,
            controllers,
        }
    }
}

/// Everything one cycle produces for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub generated_at: DateTime<Utc>,
    pub flights: Vec<FlightRow>,
    pub specialty_summary: Vec<SummaryRow>,
    /// Present only when a group configuration is active
    pub group_summary: Option<Vec<SummaryRow>>,
    pub controllers: Vec<Controller>,
}

/// Flight list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRow {
    pub callsign: String,
    pub aircraft_type: String,
    pub groundspeed_kt: f64,
    pub altitude_ft: Option<f64>,
    /// Altitude rounded to the nearest 500 ft
    pub altitude_display_ft: Option<i64>,
    pub departure: String,
    pub arrival: String,
    pub filed_route: String,
    pub lat: f64,
    pub lon: f64,
    pub assignment: Assignment,
    pub near_perimeter: bool,
    /// `TRACON` for terminal traffic, otherwise `sector (specialty)`
    pub display_sector: String,
    pub projections: Vec<ProjectedPoint>,
}

impl FlightRow {
    pub fn from_projected(flight: &ProjectedFlight, rules: &ClassifierRules) -> Self {
        let c = &flight.classification;
        let plan = c.flight_plan.clone().unwrap_or_default();

        let display_sector = if rules.is_terminal(c.altitude_ft) {
            "TRACON".to_string()
        } else {
            match &c.assignment {
                Assignment::Assigned { sector, specialty } => format!("{sector} ({specialty})"),
                Assignment::Unassigned => "PERIMETER".to_string(),
            }
        };

        Self {
            callsign: c.callsign.clone(),
            aircraft_type: plan.aircraft_type().unwrap_or_default().to_string(),
            groundspeed_kt: c.groundspeed_kt,
            altitude_ft: c.altitude_ft,
            altitude_display_ft: c.altitude_ft.map(round_altitude),
            departure: plan.departure.unwrap_or_default().to_uppercase(),
            arrival: plan.arrival.unwrap_or_default().to_uppercase(),
            filed_route: plan.route.unwrap_or_default(),
            lat: c.lat,
            lon: c.lon,
            assignment: c.assignment.clone(),
            near_perimeter: c.near_perimeter,
            display_sector,
            projections: flight.projections.clone(),
        }
    }
}

/// Round half up to the display step.
fn round_altitude(altitude_ft: f64) -> i64 {
    ((altitude_ft / ALTITUDE_DISPLAY_STEP_FT + 0.5).floor() * ALTITUDE_DISPLAY_STEP_FT) as i64
}

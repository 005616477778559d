//! Core data models: live traffic feed records and sector assignments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One aircraft as reported by the live position feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AircraftRecord {
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Feet
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Degrees true
    #[serde(default)]
    pub heading: Option<f64>,
    /// Knots
    #[serde(default)]
    pub groundspeed: Option<f64>,
    #[serde(default)]
    pub flight_plan: Option<FlightPlanInfo>,
}

impl AircraftRecord {
    /// `(lat, lon)` when both are present and finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.filter(|v| v.is_finite())?;
        let lon = self.longitude.filter(|v| v.is_finite())?;
        Some((lat, lon))
    }
}

/// Filed flight plan fields carried through to the flight list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanInfo {
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub arrival: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub aircraft: Option<String>,
    #[serde(default)]
    pub aircraft_short: Option<String>,
}

impl FlightPlanInfo {
    /// Short ICAO type if filed, otherwise the full equipment string.
    pub fn aircraft_type(&self) -> Option<&str> {
        self.aircraft_short
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.aircraft.as_deref().filter(|s| !s.is_empty()))
    }
}

/// A controller position from the traffic feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub callsign: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cid: Option<u64>,
}

impl Controller {
    /// Matches `<PREFIX>_<two digits>_CTR`, e.g. `HOU_48_CTR`.
    pub fn is_enroute_position(&self, prefix: &str) -> bool {
        let mut parts = self.callsign.split('_');
        let (Some(facility), Some(number), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        facility == prefix
            && number.len() == 2
            && number.bytes().all(|b| b.is_ascii_digit())
            && suffix == "CTR"
    }
}

/// Parsed traffic snapshot for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficFeed {
    #[serde(default)]
    pub pilots: Vec<AircraftRecord>,
    #[serde(default)]
    pub controllers: Vec<Controller>,
}

impl TrafficFeed {
    /// Build a snapshot from the raw feed payload.
    ///
    /// Records that fail to parse are skipped individually so one malformed
    /// pilot never aborts the cycle.
    pub fn from_value(payload: &Value) -> Self {
        let pilots = parse_records::<AircraftRecord>(payload.get("pilots"), "pilot");
        let controllers = parse_records::<Controller>(payload.get("controllers"), "controller");
        Self {
            pilots,
            controllers,
        }
    }

    /// Enroute controllers online for the given facility prefix.
    pub fn enroute_controllers(&self, prefix: &str) -> Vec<Controller> {
        self.controllers
            .iter()
            .filter(|c| c.is_enroute_position(prefix))
            .cloned()
            .collect()
    }
}

fn parse_records<T: serde::de::DeserializeOwned>(list: Option<&Value>, kind: &str) -> Vec<T> {
    let Some(items) = list.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut skipped = 0usize;
    let records: Vec<T> = items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        tracing::debug!("Skipped {} malformed {} record(s)", skipped, kind);
    }
    records
}

/// Result of resolving a position against the sector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assignment {
    Assigned { sector: String, specialty: String },
    Unassigned,
}

impl Assignment {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Assignment::Assigned { .. })
    }

    pub fn sector_id(&self) -> Option<&str> {
        match self {
            Assignment::Assigned { sector, .. } => Some(sector.as_str()),
            Assignment::Unassigned => None,
        }
    }

    /// Specialty label, `None` when unassigned or the sector has no label.
    pub fn specialty(&self) -> Option<&str> {
        match self {
            Assignment::Assigned { specialty, .. } if !specialty.trim().is_empty() => {
                Some(specialty.as_str())
            }
            _ => None,
        }
    }
}

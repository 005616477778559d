//! Dead-reckoning projection of admitted aircraft to the look-ahead horizons.

use serde::{Deserialize, Serialize};

use crate::classifier::Classification;
use crate::models::Assignment;
use crate::sectors::SectorIndex;
use crate::spatial::project_position;

static UNASSIGNED: Assignment = Assignment::Unassigned;

/// Time offset at which occupancy is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Now,
    Plus5,
    Plus10,
    Plus20,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [Horizon::Now, Horizon::Plus5, Horizon::Plus10, Horizon::Plus20];
    pub const PROJECTED: [Horizon; 3] = [Horizon::Plus5, Horizon::Plus10, Horizon::Plus20];

    pub fn minutes(self) -> f64 {
        match self {
            Horizon::Now => 0.0,
            Horizon::Plus5 => 5.0,
            Horizon::Plus10 => 10.0,
            Horizon::Plus20 => 20.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Horizon::Now => "Now",
            Horizon::Plus5 => "+5",
            Horizon::Plus10 => "+10",
            Horizon::Plus20 => "+20",
        }
    }
}

/// Projected position and its re-resolved sector for one horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub horizon: Horizon,
    pub lat: f64,
    pub lon: f64,
    pub assignment: Assignment,
}

/// A classified aircraft with its +5/+10/+20 minute projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedFlight {
    pub classification: Classification,
    pub projections: Vec<ProjectedPoint>,
}

impl ProjectedFlight {
    /// Assignment at a horizon. `Now` is the classifier's result.
    pub fn assignment_at(&self, horizon: Horizon) -> &Assignment {
        if horizon == Horizon::Now {
            return &self.classification.assignment;
        }
        self.projections
            .iter()
            .find(|p| p.horizon == horizon)
            .map(|p| &p.assignment)
            .unwrap_or(&UNASSIGNED)
    }
}

/// Project an aircraft along its current heading and groundspeed.
///
/// Altitude is held at its current value for every horizon. An aircraft
/// without a heading stays where it is.
pub fn project(classification: Classification, index: &SectorIndex) -> ProjectedFlight {
    let c = &classification;
    let projections = Horizon::PROJECTED
        .iter()
        .map(|&horizon| {
            let (lat, lon) = match c.heading_deg {
                Some(heading) => {
                    project_position(c.lat, c.lon, heading, c.groundspeed_kt, horizon.minutes())
                }
                None => (c.lat, c.lon),
            };
            ProjectedPoint {
                horizon,
                lat,
                lon,
                assignment: index.resolve(lon, lat, c.altitude_ft),
            }
        })
        .collect();

    ProjectedFlight {
        classification,
        projections,
    }
}

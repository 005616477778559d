//! Admission rules and thresholds for the sector engine.

use serde::{Deserialize, Serialize};

/// Configuration for aircraft admission and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Sector id (case-insensitive) of the outer boundary region
    pub perimeter_designator: String,
    /// Maximum distance from the perimeter boundary for fallback admission (NM)
    pub perimeter_admission_nm: f64,
    /// Maximum heading deviation from the bearing to the nearest perimeter vertex (degrees)
    pub heading_gate_deg: f64,
    /// Look-ahead distance used to pre-assign perimeter traffic (NM)
    pub lookahead_nm: f64,
    /// Aircraft slower than this are treated as on the ground (knots)
    pub min_groundspeed_kt: f64,
    /// Aircraft below this altitude are terminal traffic and not counted (feet)
    pub terminal_ceiling_ft: f64,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            perimeter_designator: "zhu".into(),
            perimeter_admission_nm: 50.0,
            heading_gate_deg: 45.0,
            lookahead_nm: 25.0,
            min_groundspeed_kt: 20.0,
            terminal_ceiling_ft: 10_000.0,
        }
    }
}

impl ClassifierRules {
    pub fn with_perimeter(mut self, designator: impl Into<String>) -> Self {
        self.perimeter_designator = designator.into();
        self
    }

    /// Missing altitude is never terminal; it simply cannot be assigned.
    pub fn is_terminal(&self, altitude_ft: Option<f64>) -> bool {
        altitude_ft.is_some_and(|alt| alt < self.terminal_ceiling_ft)
    }
}

/// Occupancy count thresholds for severity banding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandThresholds {
    /// Counts at or above this are medium
    pub medium_from: u32,
    /// Counts at or above this are high
    pub high_from: u32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            medium_from: 10,
            high_from: 20,
        }
    }
}

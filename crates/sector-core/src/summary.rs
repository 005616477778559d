//! Occupancy aggregation per specialty and per custom group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::groups::GroupConfig;
use crate::projection::{Horizon, ProjectedFlight};
use crate::rules::{BandThresholds, ClassifierRules};
use crate::sectors::SectorIndex;

/// Workload severity for one count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl BandThresholds {
    pub fn band(&self, count: u32) -> Band {
        if count >= self.high_from {
            Band::High
        } else if count >= self.medium_from {
            Band::Medium
        } else {
            Band::Low
        }
    }
}

/// One count per horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonCounts {
    pub now: u32,
    pub plus5: u32,
    pub plus10: u32,
    pub plus20: u32,
}

impl HorizonCounts {
    pub fn get(&self, horizon: Horizon) -> u32 {
        match horizon {
            Horizon::Now => self.now,
            Horizon::Plus5 => self.plus5,
            Horizon::Plus10 => self.plus10,
            Horizon::Plus20 => self.plus20,
        }
    }

    fn increment(&mut self, horizon: Horizon) {
        let slot = match horizon {
            Horizon::Now => &mut self.now,
            Horizon::Plus5 => &mut self.plus5,
            Horizon::Plus10 => &mut self.plus10,
            Horizon::Plus20 => &mut self.plus20,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonBands {
    pub now: Band,
    pub plus5: Band,
    pub plus10: Band,
    pub plus20: Band,
}

impl HorizonBands {
    pub fn from_counts(counts: &HorizonCounts, thresholds: &BandThresholds) -> Self {
        Self {
            now: thresholds.band(counts.now),
            plus5: thresholds.band(counts.plus5),
            plus10: thresholds.band(counts.plus10),
            plus20: thresholds.band(counts.plus20),
        }
    }
}

/// A labelled row of the specialty or group summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub counts: HorizonCounts,
    pub bands: HorizonBands,
}

impl SummaryRow {
    fn new(label: String, counts: HorizonCounts, thresholds: &BandThresholds) -> Self {
        let bands = HorizonBands::from_counts(&counts, thresholds);
        Self {
            label,
            counts,
            bands,
        }
    }
}

/// Per-specialty counts at every horizon, sorted by label.
///
/// Every specialty in the index gets a row, even with no traffic. Terminal
/// traffic (below the terminal ceiling) is not counted.
pub fn summarize_specialties(
    flights: &[ProjectedFlight],
    index: &SectorIndex,
    rules: &ClassifierRules,
    thresholds: &BandThresholds,
) -> Vec<SummaryRow> {
    let mut counts: BTreeMap<String, HorizonCounts> = index
        .all_specialties()
        .into_iter()
        .map(|s| (s, HorizonCounts::default()))
        .collect();

    for flight in enroute(flights, rules) {
        for horizon in Horizon::ALL {
            if let Some(specialty) = flight.assignment_at(horizon).specialty() {
                counts
                    .entry(specialty.to_string())
                    .or_default()
                    .increment(horizon);
            }
        }
    }

    counts
        .into_iter()
        .map(|(label, c)| SummaryRow::new(label, c, thresholds))
        .collect()
}

/// Per-group counts at every horizon, in configuration order.
///
/// An aircraft counts toward every group listing its sector at that horizon.
pub fn summarize_groups(
    flights: &[ProjectedFlight],
    groups: &GroupConfig,
    rules: &ClassifierRules,
    thresholds: &BandThresholds,
) -> Vec<SummaryRow> {
    let mut counts = vec![HorizonCounts::default(); groups.groups().len()];

    for flight in enroute(flights, rules) {
        for horizon in Horizon::ALL {
            let Some(sector_id) = flight.assignment_at(horizon).sector_id() else {
                continue;
            };
            for (slot, group) in counts.iter_mut().zip(groups.groups()) {
                if group.contains(sector_id) {
                    slot.increment(horizon);
                }
            }
        }
    }

    groups
        .groups()
        .iter()
        .zip(counts)
        .map(|(group, c)| SummaryRow::new(group.name.clone(), c, thresholds))
        .collect()
}

fn enroute<'a>(
    flights: &'a [ProjectedFlight],
    rules: &'a ClassifierRules,
) -> impl Iterator<Item = &'a ProjectedFlight> {
    flights
        .iter()
        .filter(move |f| !rules.is_terminal(f.classification.altitude_ft))
}

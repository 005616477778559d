//! Monitoring session: the active custom groups and the occupancy log.
//!
//! This is the only state that outlives a cycle. Group configurations are
//! handed to cycles as `Arc` snapshots so a replacement never mixes with a
//! cycle already in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::CycleReport;
use crate::groups::{GroupConfig, GroupConfigError};
use crate::summary::SummaryRow;

const TIMESTAMP_HEADER: &str = "Timestamp (UTC)";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

#[derive(Debug, Default)]
pub struct MonitorSession {
    groups: Option<Arc<GroupConfig>>,
    log: SummaryLog,
}

impl MonitorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active configuration for one cycle.
    pub fn groups(&self) -> Option<Arc<GroupConfig>> {
        self.groups.clone()
    }

    pub fn replace_groups(&mut self, config: GroupConfig) {
        self.groups = Some(Arc::new(config));
    }

    /// Validate and activate an uploaded group file. On error the previous
    /// configuration stays active.
    pub fn upload_groups(&mut self, input: &str) -> Result<Arc<GroupConfig>, GroupConfigError> {
        let config = Arc::new(GroupConfig::from_json_str(input)?);
        self.groups = Some(config.clone());
        Ok(config)
    }

    pub fn clear_groups(&mut self) {
        self.groups = None;
    }

    /// Start a fresh log. Any previous rows are discarded.
    pub fn start_logging(&mut self) {
        self.log = SummaryLog {
            active: true,
            ..SummaryLog::default()
        };
    }

    /// Stop appending; collected rows stay available for export.
    pub fn stop_logging(&mut self) {
        self.log.active = false;
    }

    pub fn reset_log(&mut self) {
        self.log = SummaryLog::default();
    }

    pub fn is_logging(&self) -> bool {
        self.log.active
    }

    pub fn log(&self) -> &SummaryLog {
        &self.log
    }

    /// Append the cycle's current counts if logging. Returns whether a row was added.
    pub fn record_cycle(&mut self, report: &CycleReport) -> bool {
        self.log.record(
            report.generated_at,
            &report.specialty_summary,
            report.group_summary.as_deref(),
        )
    }
}

/// Column of the occupancy log after the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum LogColumn {
    Specialty(String),
    Group(String),
}

impl LogColumn {
    pub fn title(&self) -> String {
        match self {
            LogColumn::Specialty(label) => format!("{label} Now"),
            LogColumn::Group(label) => format!("{label} Split Now"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub timestamp: DateTime<Utc>,
    /// One count per column, in column order
    pub counts: Vec<u32>,
}

/// Append-only log of "now" counts. The column set is frozen by the first row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryLog {
    pub active: bool,
    pub columns: Vec<LogColumn>,
    pub rows: Vec<LogRow>,
}

impl SummaryLog {
    pub fn header(&self) -> Vec<String> {
        std::iter::once(TIMESTAMP_HEADER.to_string())
            .chain(self.columns.iter().map(LogColumn::title))
            .collect()
    }

    fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        specialties: &[SummaryRow],
        groups: Option<&[SummaryRow]>,
    ) -> bool {
        if !self.active || specialties.is_empty() {
            return false;
        }

        if self.rows.is_empty() && self.columns.is_empty() {
            self.columns = specialties
                .iter()
                .map(|r| LogColumn::Specialty(r.label.clone()))
                .chain(
                    groups
                        .unwrap_or_default()
                        .iter()
                        .map(|r| LogColumn::Group(r.label.clone())),
                )
                .collect();
        }

        let counts = self
            .columns
            .iter()
            .map(|column| {
                let (rows, label) = match column {
                    LogColumn::Specialty(label) => (specialties, label),
                    LogColumn::Group(label) => (groups.unwrap_or_default(), label),
                };
                rows.iter()
                    .find(|r| &r.label == label)
                    .map(|r| r.counts.now)
                    .unwrap_or(0)
            })
            .collect();

        self.rows.push(LogRow { timestamp, counts });
        true
    }

    /// CSV export: every field quoted, CRLF between rows. `None` until a row exists.
    pub fn to_csv(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(csv_line(self.header()));
        for row in &self.rows {
            let fields = std::iter::once(row.timestamp.format(TIMESTAMP_FORMAT).to_string())
                .chain(row.counts.iter().map(u32::to_string));
            lines.push(csv_line(fields));
        }
        Some(lines.join("\r\n"))
    }
}

fn csv_line(fields: impl IntoIterator<Item = String>) -> String {
    fields
        .into_iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

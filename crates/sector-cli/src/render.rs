//! Plain-text tables for terminal output.

use std::fmt::Write as _;

use sector_core::{Band, CycleReport, FlightRow, Horizon, SummaryRow};

fn band_marker(band: Band) -> &'static str {
    match band {
        Band::Low => "",
        Band::Medium => "*",
        Band::High => "!",
    }
}

/// Summary table: one row per label, one column per horizon.
///
/// Medium counts are marked `*`, high counts `!`.
pub fn summary_table(title: &str, rows: &[SummaryRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once(title.chars().count()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = write!(out, "{:<width$}", title, width = width);
    for horizon in Horizon::ALL {
        let _ = write!(out, " {:>6}", horizon.label());
    }
    out.push('\n');

    for row in rows {
        let _ = write!(out, "{:<width$}", row.label, width = width);
        for (horizon, band) in [
            (Horizon::Now, row.bands.now),
            (Horizon::Plus5, row.bands.plus5),
            (Horizon::Plus10, row.bands.plus10),
            (Horizon::Plus20, row.bands.plus20),
        ] {
            let cell = format!("{}{}", row.counts.get(horizon), band_marker(band));
            let _ = write!(out, " {:>6}", cell);
        }
        out.push('\n');
    }
    out
}

/// Flight list, one line per admitted aircraft.
pub fn flight_table(rows: &[FlightRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<6} {:>5} {:>7} {:<5} {:<5} {:<20} {}",
        "CALLSIGN", "TYPE", "GS", "ALT", "DEP", "ARR", "SECTOR", "+5 / +10 / +20"
    );
    for row in rows {
        let altitude = row
            .altitude_display_ft
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let ahead: Vec<&str> = row
            .projections
            .iter()
            .map(|p| p.assignment.sector_id().unwrap_or("-"))
            .collect();
        let sector = if row.near_perimeter {
            format!("{}^", row.display_sector)
        } else {
            row.display_sector.clone()
        };
        let _ = writeln!(
            out,
            "{:<10} {:<6} {:>5.0} {:>7} {:<5} {:<5} {:<20} {}",
            row.callsign,
            row.aircraft_type,
            row.groundspeed_kt,
            altitude,
            row.departure,
            row.arrival,
            sector,
            ahead.join(" / ")
        );
    }
    out
}

/// Everything printed for one snapshot.
pub fn report_text(report: &CycleReport) -> String {
    let mut out = format!(
        "Snapshot at {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%SZ")
    );
    out.push_str(&summary_table("SPECIALTY", &report.specialty_summary));
    if let Some(groups) = &report.group_summary {
        out.push('\n');
        out.push_str(&summary_table("SPLIT", groups));
    }
    out.push('\n');
    out.push_str(&flight_table(&report.flights));
    if !report.controllers.is_empty() {
        out.push_str("\nOnline enroute controllers:\n");
        for controller in &report.controllers {
            let _ = writeln!(
                out,
                "  {} {}",
                controller.callsign,
                controller.name.as_deref().unwrap_or("")
            );
        }
    }
    out
}

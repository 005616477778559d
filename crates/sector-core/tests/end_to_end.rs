//! Full cycle tests: raw feed payloads in, summaries and log out.

use chrono::{TimeZone, Utc};
use sector_core::{
    BandThresholds, ClassifierRules, CycleContext, GroupConfig, HorizonCounts, MonitorSession,
    SectorIndex, TrafficFeed,
};
use serde_json::{json, Value};

fn square_feature(sector: &str, specialty: &str, lon0: f64, lat0: f64, floor: Value, ceiling: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": { "sector": sector, "specialty": specialty, "floor": floor, "ceiling": ceiling },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [lon0, lat0],
                [lon0 + 1.0, lat0],
                [lon0 + 1.0, lat0 + 1.0],
                [lon0, lat0 + 1.0],
                [lon0, lat0]
            ]]
        }
    })
}

fn pilot(callsign: &str, lat: f64, lon: f64, altitude: f64, heading: f64, groundspeed: f64) -> Value {
    json!({
        "callsign": callsign,
        "latitude": lat,
        "longitude": lon,
        "altitude": altitude,
        "heading": heading,
        "groundspeed": groundspeed,
        "flight_plan": {
            "departure": "kiah",
            "arrival": "KDFW",
            "route": "DCT",
            "aircraft_short": "B738"
        }
    })
}

fn single_sector_index() -> SectorIndex {
    let payload = json!({
        "type": "FeatureCollection",
        "features": [square_feature("ZHU_1", "LOW", -96.0, 29.0, json!(0), json!(18000))]
    });
    SectorIndex::from_geojson(&payload, "zhu").unwrap()
}

fn run(index: &SectorIndex, pilots: Vec<Value>, groups: Option<&GroupConfig>) -> sector_core::CycleReport {
    let rules = ClassifierRules::default();
    let thresholds = BandThresholds::default();
    let feed = TrafficFeed::from_value(&json!({ "pilots": pilots, "controllers": [] }));
    CycleContext::new(index, &rules, &thresholds)
        .with_groups(groups)
        .run(&feed, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
}

#[test]
fn display_labels_for_terminal_and_perimeter_traffic() {
    let payload = json!({
        "type": "FeatureCollection",
        "features": [
            square_feature("ZHU", "", -96.0, 29.0, Value::Null, Value::Null),
            square_feature("46", "LOW", -96.0, 29.0, json!(0), json!(18000))
        ]
    });
    let index = SectorIndex::from_geojson(&payload, "zhu").unwrap();
    let report = run(
        &index,
        vec![
            // ~18 NM north of the perimeter, southbound above every band
            pilot("UAL2", 30.3, -95.1, 30000.0, 180.0, 450.0),
            pilot("AAL1", 29.5, -95.5, 8000.0, 90.0, 200.0),
        ],
        None,
    );

    assert_eq!(report.flights.len(), 2);
    assert_eq!(report.flights[0].callsign, "AAL1");
    assert_eq!(report.flights[0].display_sector, "TRACON");
    assert_eq!(report.flights[0].assignment.sector_id(), Some("46"));

    let perimeter = &report.flights[1];
    assert_eq!(perimeter.callsign, "UAL2");
    assert!(perimeter.near_perimeter);
    assert!(!perimeter.assignment.is_assigned());
    assert_eq!(perimeter.display_sector, "PERIMETER");
}

#[test]
fn aircraft_inside_sector_is_counted() {
    let index = single_sector_index();
    let report = run(&index, vec![pilot("AAL1", 29.5, -95.5, 12000.0, 90.0, 250.0)], None);

    assert_eq!(report.flights.len(), 1);
    let flight = &report.flights[0];
    assert_eq!(flight.assignment.sector_id(), Some("ZHU_1"));
    assert_eq!(flight.display_sector, "ZHU_1 (LOW)");
    assert_eq!(flight.departure, "KIAH");
    assert_eq!(flight.aircraft_type, "B738");
    assert!(!flight.near_perimeter);

    assert_eq!(report.specialty_summary.len(), 1);
    assert_eq!(report.specialty_summary[0].label, "LOW");
    assert_eq!(report.specialty_summary[0].counts.now, 1);
    assert!(report.group_summary.is_none());
}

#[test]
fn slow_aircraft_excluded() {
    let index = single_sector_index();
    let report = run(&index, vec![pilot("N123", 29.5, -95.5, 12000.0, 90.0, 15.0)], None);
    assert!(report.flights.is_empty());
    assert_eq!(report.specialty_summary[0].counts, HorizonCounts::default());
}

#[test]
fn overlapping_sectors_first_feature_wins() {
    let payload = json!({
        "features": [
            square_feature("A", "ALPHA", -96.0, 29.0, json!(0), json!(40000)),
            square_feature("B", "BRAVO", -95.5, 29.0, json!(0), json!(40000))
        ]
    });
    let index = SectorIndex::from_geojson(&payload, "zhu").unwrap();
    let report = run(&index, vec![pilot("UAL9", 29.5, -95.2, 30000.0, 0.0, 300.0)], None);
    assert_eq!(report.flights[0].assignment.sector_id(), Some("A"));
}

#[test]
fn empty_traffic_yields_zero_rows() {
    let index = single_sector_index();
    let report = run(&index, Vec::new(), None);
    assert!(report.flights.is_empty());
    assert_eq!(report.specialty_summary.len(), 1);
    assert_eq!(report.specialty_summary[0].counts, HorizonCounts::default());
}

#[test]
fn aircraft_counts_toward_every_listing_group() {
    let index = single_sector_index();
    let groups =
        GroupConfig::from_json_str(r#"{ "Solo": ["ZHU_1"], "Combined": ["ZHU_1", "ZHU_2"], "Other": ["ZHU_2"] }"#)
            .unwrap();
    // stationary-ish heading north, stays inside for +5
    let report = run(
        &index,
        vec![pilot("DAL7", 29.1, -95.5, 12000.0, 0.0, 60.0)],
        Some(&groups),
    );
    let rows = report.group_summary.unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Solo", "Combined", "Other"]);
    assert_eq!(rows[0].counts.now, 1);
    assert_eq!(rows[1].counts.now, 1);
    assert_eq!(rows[2].counts.now, 0);
    assert_eq!(rows[0].counts.plus5, 1);
}

#[test]
fn session_logs_cycle_and_exports_csv() {
    let index = single_sector_index();
    let mut session = MonitorSession::new();
    session.upload_groups(r#"{ "Solo": ["ZHU_1"] }"#).unwrap();
    session.start_logging();

    let groups = session.groups();
    let report = run(
        &index,
        vec![pilot("AAL1", 29.5, -95.5, 12000.0, 90.0, 250.0)],
        groups.as_deref(),
    );
    assert!(session.record_cycle(&report));

    let csv = session.log().to_csv().unwrap();
    assert_eq!(
        csv,
        "\"Timestamp (UTC)\",\"LOW Now\",\"Solo Split Now\"\r\n\"2024-05-01 12:00:00Z\",\"1\",\"1\""
    );
}

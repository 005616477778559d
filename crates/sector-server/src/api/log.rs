//! Occupancy log lifecycle and export.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use sector_core::LogRow;

use crate::state::AppState;

const CSV_FILENAME: &str = "specialty_summary_log.csv";

#[derive(Debug, Serialize)]
pub struct LogView {
    pub active: bool,
    pub header: Vec<String>,
    pub rows: Vec<LogRow>,
}

pub async fn get_log(State(state): State<Arc<AppState>>) -> Json<LogView> {
    let session = state.session();
    let log = session.log();
    Json(LogView {
        active: log.active,
        header: log.header(),
        rows: log.rows.clone(),
    })
}

/// CSV download; 404 until at least one row has been logged.
pub async fn export_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let csv = state.session().log().to_csv();
    match csv {
        Some(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_FILENAME),
                ),
            ],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No log data to export").into_response(),
    }
}

pub async fn start_log(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session().start_logging();
    tracing::info!("Occupancy logging started");
    StatusCode::NO_CONTENT
}

pub async fn stop_log(State(state): State<Arc<AppState>>) -> StatusCode {
    let rows = {
        let mut session = state.session();
        session.stop_logging();
        session.log().rows.len()
    };
    tracing::info!("Occupancy logging stopped with {} row(s)", rows);
    StatusCode::NO_CONTENT
}

pub async fn reset_log(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session().reset_log();
    tracing::info!("Occupancy log reset");
    StatusCode::NO_CONTENT
}

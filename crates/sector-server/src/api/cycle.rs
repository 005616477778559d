//! Read endpoints over the latest cycle report.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use sector_core::{Controller, CycleReport, FlightRow, SummaryRow};

use crate::state::{AppState, CycleStatus};

type ApiError = (StatusCode, Json<Value>);

fn latest(state: &AppState) -> Result<Arc<CycleReport>, ApiError> {
    state.latest_report().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "No cycle has completed yet",
                "last_error": state.status().last_error
            })),
        )
    })
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<CycleStatus> {
    Json(state.status())
}

/// Admitted aircraft, sorted by callsign.
pub async fn list_flights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FlightRow>>, ApiError> {
    let report = latest(&state)?;
    Ok(Json(report.flights.clone()))
}

pub async fn specialty_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SummaryRow>>, ApiError> {
    let report = latest(&state)?;
    Ok(Json(report.specialty_summary.clone()))
}

/// Group rows in configuration order; empty when no groups were active.
pub async fn group_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SummaryRow>>, ApiError> {
    let report = latest(&state)?;
    Ok(Json(report.group_summary.clone().unwrap_or_default()))
}

pub async fn list_controllers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Controller>>, ApiError> {
    let report = latest(&state)?;
    Ok(Json(report.controllers.clone()))
}

pub async fn request_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    state.request_refresh();
    tracing::info!("Manual refresh requested");
    StatusCode::ACCEPTED
}

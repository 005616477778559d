//! REST API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{cycle, groups, log};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        // Cycle outputs
        .route("/v1/status", get(cycle::get_status))
        .route("/v1/flights", get(cycle::list_flights))
        .route("/v1/summary/specialties", get(cycle::specialty_summary))
        .route("/v1/summary/groups", get(cycle::group_summary))
        .route("/v1/controllers", get(cycle::list_controllers))
        .route("/v1/refresh", post(cycle::request_refresh))
        // Custom groups
        .route(
            "/v1/groups",
            get(groups::get_groups)
                .put(groups::upload_groups)
                .delete(groups::clear_groups),
        )
        // Occupancy log
        .route("/v1/log", get(log::get_log))
        .route("/v1/log.csv", get(log::export_csv))
        .route("/v1/log/start", post(log::start_log))
        .route("/v1/log/stop", post(log::stop_log))
        .route("/v1/log/reset", post(log::reset_log))
}

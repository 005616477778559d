//! Custom group endpoints.
//!
//! Uploads take the raw JSON text so group order survives parsing.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use sector_core::GroupConfig;

use crate::state::AppState;

/// Active group configuration.
pub async fn get_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GroupConfig>, StatusCode> {
    state
        .session()
        .groups()
        .map(|config| Json(config.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Replace the active configuration. A rejected file leaves the old one in place.
pub async fn upload_groups(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<GroupConfig>, (StatusCode, Json<Value>)> {
    let result = state.session().upload_groups(&body);
    match result {
        Ok(config) => {
            tracing::info!("Loaded {} custom group(s)", config.groups().len());
            state.request_refresh();
            Ok(Json(config.as_ref().clone()))
        }
        Err(err) => {
            tracing::warn!("Rejected group upload: {}", err);
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Group file rejected",
                    "detail": err.to_string()
                })),
            ))
        }
    }
}

pub async fn clear_groups(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session().clear_groups();
    tracing::info!("Cleared custom groups");
    state.request_refresh();
    StatusCode::NO_CONTENT
}

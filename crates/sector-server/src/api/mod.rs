//! API routes for the sector server.

pub mod cycle;
pub mod groups;
pub mod log;
mod routes;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

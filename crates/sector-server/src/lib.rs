//! Shared library surface for the sector server and its tests.

pub mod api;
pub mod backoff;
pub mod config;
pub mod loops;
pub mod state;

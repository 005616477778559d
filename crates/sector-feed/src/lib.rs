//! Sector Feed - traffic and sector data loaders
//!
//! Fetches the live traffic snapshot and the sector boundary collection,
//! from a local file or over HTTP.

pub mod client;
pub mod source;

pub use client::{load_groups, FeedClient};
pub use source::Source;

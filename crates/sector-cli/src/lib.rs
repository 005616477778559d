//! Sector CLI - command line tools for the sector occupancy engine.
//!
//! Binaries:
//! - sector-snapshot: run one cycle over traffic and sector feeds and print the result

pub mod render;

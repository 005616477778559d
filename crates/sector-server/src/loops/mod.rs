//! Background loops for continuous processing.

pub mod cycle_loop;

//! Report rendering for the aggregated ranking.

pub mod generator;

pub use generator::*;

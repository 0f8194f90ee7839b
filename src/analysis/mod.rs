//! Analysis modules.
//!
//! Parsing and scoring of pasted stock-pick text.

pub mod aggregator;

pub use aggregator::*;

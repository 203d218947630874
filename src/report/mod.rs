//! Race results reporting.
//!
//! This module provides:
//! - `aggregate`: fastest and average times from the stored sheets
//! - `Report`: the result structure, rendered as text or serialized to JSON

pub mod aggregate;
pub mod results;

// Re-export key types
pub use aggregate::aggregate;
pub use results::{AggregationMethod, FastestLane, RacerAverages, Report};

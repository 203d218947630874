//! Core types for derby-tracker.
//!
//! This module contains the record types stored in the workbook and the
//! form validation that produces them from raw text fields.

pub mod form;
pub mod schema;

// Re-export key types for convenience
pub use form::{RaceTimeInput, RacerForm, confirm_counts, parse_race_times};
pub use schema::{
    Lane, RACE_TIME_COLUMNS, RACE_TIMES_SHEET, RACER_COLUMNS, RACER_SHEET, RACES_PER_BATCH,
    RaceTimeBatch, RaceTimeEntry, RacerNumber, RacerProfile, SessionCounts,
};

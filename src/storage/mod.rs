//! Storage layer for race records.
//!
//! This module provides the workbook file format, the append-only record
//! store on top of it, and CSV interchange.

pub mod csv;
pub mod store;
pub mod workbook;

// Re-export key types
pub use csv::{CsvExporter, CsvRaceTimeReader};
pub use store::RecordStore;
pub use workbook::{Cell, Sheet, WORKBOOK_VERSION, Workbook};

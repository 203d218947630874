use std::path::PathBuf;

use tracing::debug;

use crate::DerbyResult;
use crate::core::form::parse_race_times;
use crate::storage::{CsvRaceTimeReader, RecordStore};

/// Run the `add-times` command: read a 10-race grid from CSV and append it.
///
/// `lanes` is the confirmed lane count; lanes above it are rejected.
/// Returns the race time row count after the append.
pub fn run(workbook: PathBuf, csv_path: PathBuf, lanes: u8) -> DerbyResult<usize> {
    let rows = CsvRaceTimeReader::new().read_file(&csv_path)?;
    debug!(rows = rows.len(), csv = %csv_path.display(), "read race time grid");

    let batch = parse_race_times(&rows, lanes)?;
    let store = RecordStore::new(&workbook);
    let total = store.append_race_times(&batch)?;
    println!(
        "add-times: races={} rows={} workbook={}",
        batch.entries().len(),
        total,
        workbook.display()
    );
    Ok(total)
}

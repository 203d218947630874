use std::path::PathBuf;

use crate::DerbyResult;
use crate::storage::{CsvExporter, RecordStore};

/// Run the `export` command: write one sheet as CSV to a file or stdout.
pub fn run(workbook: PathBuf, sheet: String, out: Option<PathBuf>) -> DerbyResult<()> {
    let store = RecordStore::new(&workbook);
    let sheet = store.load(&sheet)?;
    let exporter = CsvExporter::new();

    match out {
        Some(path) => {
            exporter.export(&sheet, &path)?;
            eprintln!(
                "Exported {} row(s) of '{}' to: {}",
                sheet.len(),
                sheet.name,
                path.display()
            );
        }
        None => exporter.export_to_stdout(&sheet)?,
    }
    Ok(())
}

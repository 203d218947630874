use std::path::PathBuf;

use crate::DerbyResult;
use crate::core::form::RacerForm;
use crate::storage::RecordStore;

/// Run the `add-racer` command.
///
/// Validates the form before the workbook is opened; returns the racer row count.
pub fn run(workbook: PathBuf, form: RacerForm) -> DerbyResult<usize> {
    let profile = form.parse()?;
    let store = RecordStore::new(&workbook);
    let rows = store.append_racer(&profile)?;
    println!(
        "add-racer: racer={} name={} rows={} workbook={}",
        profile.racer_number.as_u8(),
        profile.racer_name,
        rows,
        workbook.display()
    );
    Ok(rows)
}

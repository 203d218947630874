use std::path::PathBuf;

use crate::DerbyResult;
use crate::report::{AggregationMethod, Report};
use crate::session::analyze_store;
use crate::storage::RecordStore;

/// Run the `report` command: aggregate the workbook and print the results.
pub fn run(
    workbook: PathBuf,
    method: AggregationMethod,
    json_out: Option<PathBuf>,
) -> DerbyResult<Report> {
    let store = RecordStore::new(&workbook);
    let report = analyze_store(&store, method)?;

    if let Some(json) = json_out {
        write_json(&report, &json)?;
    }
    println!("{}", report.render_text());
    Ok(report)
}

pub(crate) fn write_json(report: &Report, json: &std::path::Path) -> DerbyResult<()> {
    if let Some(dir) = json.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    std::fs::write(json, serde_json::to_vec_pretty(report)?)?;
    Ok(())
}

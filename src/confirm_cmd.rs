use crate::DerbyResult;
use crate::core::form::confirm_counts;
use crate::core::schema::SessionCounts;

/// Run the `confirm` command: check racer and lane counts without touching any workbook.
pub fn run(racers: &str, lanes: &str) -> DerbyResult<SessionCounts> {
    let counts = confirm_counts(racers, lanes)?;
    println!("confirm: racers={} lanes={}", counts.racers, counts.lanes);
    Ok(counts)
}

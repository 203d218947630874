//! CSV export of workbook sheets and CSV import of race time grids.

use std::io::{Read, Write};
use std::path::Path;

use super::workbook::Sheet;
use crate::core::form::RaceTimeInput;
use crate::core::schema::RACE_TIME_COLUMNS;
use crate::{DerbyError, DerbyResult};

/// CSV exporter for workbook sheets.
///
/// Writes the header row followed by every data row, cells rendered as text.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CsvExporter.
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export a sheet to a CSV file.
    ///
    /// # Errors
    /// Returns an error if file operations or CSV writing fails.
    pub fn export(&self, sheet: &Sheet, output: &Path) -> DerbyResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::File::create(output)?;
        self.export_to_writer(sheet, file)
    }

    /// Export a sheet to stdout.
    pub fn export_to_stdout(&self, sheet: &Sheet) -> DerbyResult<()> {
        let stdout = std::io::stdout();
        let handle = stdout.lock();
        self.export_to_writer(sheet, handle)
    }

    /// Export a sheet to any writer implementing Write.
    pub fn export_to_writer<W: Write>(&self, sheet: &Sheet, writer: W) -> DerbyResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(&sheet.columns)?;

        let width = sheet.columns.len();
        for row in &sheet.rows {
            let mut record: Vec<String> = row.iter().map(|c| c.as_text()).collect();
            record.resize(width, String::new());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Reads a race time grid from CSV.
///
/// The header must name the four lane/time columns; a `Race #` column is
/// allowed and ignored, since race indices come from row order.
#[derive(Debug, Clone, Default)]
pub struct CsvRaceTimeReader;

impl CsvRaceTimeReader {
    pub fn new() -> Self {
        CsvRaceTimeReader
    }

    pub fn read_file(&self, input: &Path) -> DerbyResult<Vec<RaceTimeInput>> {
        if !input.exists() {
            return Err(DerbyError::NotFound(format!(
                "race time file not found: {}",
                input.display()
            )));
        }
        let file = std::fs::File::open(input)?;
        self.read_from(file)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> DerbyResult<Vec<RaceTimeInput>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let index_of = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DerbyError::Schema {
                    sheet: "race time CSV".to_string(),
                    column: column.to_string(),
                })
        };
        let idx = [
            index_of(RACE_TIME_COLUMNS[1])?,
            index_of(RACE_TIME_COLUMNS[2])?,
            index_of(RACE_TIME_COLUMNS[3])?,
            index_of(RACE_TIME_COLUMNS[4])?,
        ];

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            let field = |i: usize| record.get(idx[i]).unwrap_or("").to_string();
            rows.push(RaceTimeInput::new(field(0), field(1), field(2), field(3)));
        }
        Ok(rows)
    }
}

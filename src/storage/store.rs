//! Append-only record store backed by a workbook file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::workbook::{Cell, Sheet, Workbook};
use crate::core::schema::{
    RACE_TIME_COLUMNS, RACE_TIMES_SHEET, RACER_COLUMNS, RACER_SHEET, RaceTimeBatch, RaceTimeEntry,
    RacerProfile,
};
use crate::{DerbyError, DerbyResult};

/// Record store for racer profiles and race times.
///
/// Both record kinds live in one workbook file. Every append reads the
/// whole file, adds the rows and writes it back, which is fine for the
/// few dozen rows a derby session produces.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Create a store for the given workbook path.
    ///
    /// The file will be created on the first append.
    pub fn new(path: impl AsRef<Path>) -> Self {
        RecordStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append one racer profile. Duplicate racer numbers are kept.
    ///
    /// Returns the number of rows in the racer sheet after the append.
    pub fn append_racer(&self, profile: &RacerProfile) -> DerbyResult<usize> {
        profile.validate()?;
        let rows = self.append(RACER_SHEET, RACER_COLUMNS, vec![racer_row(profile)])?;
        info!(
            racer = profile.racer_number.as_u8(),
            name = %profile.racer_name,
            rows,
            "saved racer details"
        );
        Ok(rows)
    }

    /// Append a full batch of race times.
    ///
    /// Returns the number of rows in the race time sheet after the append.
    pub fn append_race_times(&self, batch: &RaceTimeBatch) -> DerbyResult<usize> {
        let new_rows = batch.entries().iter().map(race_time_row).collect();
        let rows = self.append(RACE_TIMES_SHEET, RACE_TIME_COLUMNS, new_rows)?;
        info!(races = batch.entries().len(), rows, "saved race times");
        Ok(rows)
    }

    /// Load one sheet in full.
    ///
    /// # Errors
    /// Returns `NotFound` if the workbook or the sheet does not exist.
    pub fn load(&self, sheet_name: &str) -> DerbyResult<Sheet> {
        let workbook = Workbook::read(&self.path)?;
        workbook.sheet(sheet_name).cloned().ok_or_else(|| {
            DerbyError::NotFound(format!(
                "sheet '{}' not found in {}",
                sheet_name,
                self.path.display()
            ))
        })
    }

    /// Number of data rows in a sheet; zero when the file or sheet is absent.
    pub fn row_count(&self, sheet_name: &str) -> DerbyResult<usize> {
        match self.load(sheet_name) {
            Ok(sheet) => Ok(sheet.len()),
            Err(DerbyError::NotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn append(&self, sheet_name: &str, columns: &[&str], rows: Vec<Vec<Cell>>) -> DerbyResult<usize> {
        let mut workbook = if self.path.exists() {
            Workbook::read(&self.path)?
        } else {
            debug!(path = %self.path.display(), "creating new workbook");
            Workbook::new()
        };

        let sheet = workbook.sheet_or_insert(sheet_name, columns);
        sheet.append_rows(columns, rows);
        let count = sheet.len();

        workbook.write(&self.path)?;
        Ok(count)
    }
}

/// Profile fields as entered, one text cell per column.
fn racer_row(profile: &RacerProfile) -> Vec<Cell> {
    vec![
        // Racer Number
        Cell::text(profile.racer_number.as_u8().to_string()),
        // Racer Name
        Cell::text(&profile.racer_name),
        // Boy Scout Rank
        Cell::text(&profile.rank),
        // Car Name
        Cell::text(&profile.car_name),
        // Car Number
        Cell::text(profile.car_number.to_string()),
        // Car Weight
        Cell::text(&profile.car_weight),
        // Mods
        Cell::text(&profile.mods),
    ]
}

fn race_time_row(entry: &RaceTimeEntry) -> Vec<Cell> {
    vec![
        Cell::Number(f64::from(entry.race)),
        Cell::Number(f64::from(entry.racer1_lane.as_u8())),
        Cell::Number(entry.racer1_time),
        Cell::Number(f64::from(entry.racer2_lane.as_u8())),
        Cell::Number(entry.racer2_time),
    ]
}

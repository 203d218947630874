//! Spreadsheet-style workbook file: named sheets of typed cells.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DerbyError, DerbyResult};

/// Format tag written at the top of every workbook file.
pub const WORKBOOK_FORMAT: &str = "derby-workbook";

/// Workbook version for forward compatibility
pub const WORKBOOK_VERSION: u32 = 1;

static EMPTY_CELL: Cell = Cell::Empty;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Cell content as display text. Integral numbers have no decimal part.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Numeric value of the cell, or `None` when it is empty or not a number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

/// A named sheet: a header row plus data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Sheet {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matching header names with surrounding whitespace removed.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns.iter().position(|c| c.trim() == wanted)
    }

    /// Like [`Sheet::column_index`] but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> DerbyResult<usize> {
        self.column_index(name).ok_or_else(|| DerbyError::Schema {
            sheet: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Cells of one column, top to bottom. Short rows yield empty cells.
    pub fn column(&self, name: &str) -> DerbyResult<Vec<&Cell>> {
        let idx = self.require_column(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
            .collect())
    }

    /// Append rows laid out as `columns`, aligning them by header name.
    ///
    /// Columns the sheet does not have yet are added at the end, and the
    /// existing rows get empty cells for them.
    pub fn append_rows(&mut self, columns: &[&str], rows: Vec<Vec<Cell>>) {
        for column in columns {
            if self.column_index(column).is_none() {
                debug!(sheet = %self.name, column, "adding missing column");
                self.columns.push(column.to_string());
            }
        }
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
        }

        let positions: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        for row in rows {
            let mut aligned = vec![Cell::Empty; width];
            for (pos, cell) in positions.iter().zip(row) {
                aligned[*pos] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

/// The whole workbook file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub format: String,
    pub version: u32,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Default for Workbook {
    fn default() -> Self {
        Workbook {
            format: WORKBOOK_FORMAT.to_string(),
            version: WORKBOOK_VERSION,
            sheets: Vec::new(),
        }
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a workbook file.
    ///
    /// # Errors
    /// Returns `NotFound` if the file does not exist, and an error if the
    /// file is not a workbook of a supported version.
    pub fn read(path: &Path) -> DerbyResult<Self> {
        if !path.exists() {
            return Err(DerbyError::NotFound(format!(
                "workbook file not found: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        let workbook: Workbook = serde_json::from_slice(&bytes)?;
        if workbook.format != WORKBOOK_FORMAT {
            return Err(DerbyError::Message(format!(
                "{} is not a race workbook (format '{}')",
                path.display(),
                workbook.format
            )));
        }
        if workbook.version != WORKBOOK_VERSION {
            return Err(DerbyError::Message(format!(
                "workbook version mismatch: file has v{}, expected v{}",
                workbook.version, WORKBOOK_VERSION
            )));
        }
        Ok(workbook)
    }

    /// Write the whole workbook, replacing the file atomically.
    pub fn write(&self, path: &Path) -> DerbyResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        let mut tmp = temp_file_in(&dir)?;
        // Rewrites keep the mode of the file they replace.
        if let Ok(existing) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| DerbyError::Io(e.error))?;
        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get a sheet for writing, creating it with `columns` if absent.
    pub fn sheet_or_insert(&mut self, name: &str, columns: &[&str]) -> &mut Sheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name, columns));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }
}

/// Temp file for an atomic save. On unix it is opened with mode 0666 so the
/// umask decides the final mode, as for any newly created file.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}

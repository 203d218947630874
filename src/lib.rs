pub mod config;
pub mod core;
pub mod report;
pub mod session;
pub mod storage;

pub mod add_racer_cmd;
pub mod add_times_cmd;
pub mod confirm_cmd;
pub mod export_cmd;
pub mod report_cmd;
pub mod run_cmd;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DerbyError {
    /// A required field is missing or out of range.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Text was supplied where a number is required.
    #[error("could not parse {field}: {value:?} is not a number")]
    Parse { field: String, value: String },
    /// The workbook file or one of its sheets does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A sheet was loaded but lacks an expected column.
    #[error("sheet '{sheet}' is missing column '{column}'")]
    Schema { sheet: String, column: String },
    /// Any other failure while computing the report.
    #[error("failed to aggregate column '{column}' (value {value:?}): {reason}")]
    Aggregation {
        column: String,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("workbook JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl DerbyError {
    pub fn parse(field: impl Into<String>, value: impl Into<String>) -> Self {
        DerbyError::Parse {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type DerbyResult<T> = Result<T, DerbyError>;

/// Render seconds the way every report line does. Missing data renders as zero.
pub fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.2} seconds", v),
        _ => "0.00 seconds".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Some(5.1251)), "5.13 seconds");
        assert_eq!(format_seconds(Some(5.0)), "5.00 seconds");
        assert_eq!(format_seconds(Some(f64::NAN)), "0.00 seconds");
        assert_eq!(format_seconds(None), "0.00 seconds");
    }

    #[test]
    fn test_parse_error_names_field() {
        let err = DerbyError::parse("Race 3: Racer 2 - Time", "fast");
        let msg = err.to_string();
        assert!(msg.contains("Race 3: Racer 2 - Time"));
        assert!(msg.contains("fast"));
    }
}

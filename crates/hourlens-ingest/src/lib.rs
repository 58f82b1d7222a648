//! # hourlens-ingest
//!
//! Timesheet readers and the time series normalizer.
//!
//! ## Supported sources
//!
//! - **CSV**: header row followed by data rows, fields trimmed
//! - **Workbooks** (`.xlsx`, `.xlsm`, `.xls`, `.ods`): the `Raw Data` sheet,
//!   or the first sheet when there is none
//!
//! Both readers produce a [`RawSheet`]; [`normalize`] turns it into a
//! [`hourlens_core::TimeTable`].
//!
//! ## Example
//!
//! ```rust
//! use hourlens_ingest::{delimited, normalize};
//!
//! let csv = "Date,Project Name,Hou\n2024-03-04,Apollo,4\n";
//! let sheet = delimited::read_csv_from(csv.as_bytes()).unwrap();
//! let normalized = normalize(&sheet).unwrap();
//! assert_eq!(normalized.table.total_hours(), 4.0);
//! ```

pub mod delimited;
pub mod normalize;
pub mod workbook;

use std::path::Path;

use thiserror::Error;

pub use normalize::{normalize, ColumnMap, Normalized, RawSheet, RawValue};

/// Errors raised while reading a timesheet
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Missing required column '{column}' (found: {found})")]
    MissingColumn { column: &'static str, found: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Input file kinds, detected by extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read the raw sheet of a file, picking the reader by extension
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<RawSheet, IngestError> {
    match SourceFormat::detect(path)? {
        SourceFormat::Csv => delimited::read_csv(path),
        SourceFormat::Workbook => workbook::read_workbook(path, sheet),
    }
}

/// Read and normalize a timesheet file
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Normalized, IngestError> {
    tracing::info!(path = %path.display(), "loading timesheet");
    let raw = read_sheet(path, sheet)?;
    let normalized = normalize(&raw)?;
    tracing::info!(
        entries = normalized.table.len(),
        projects = normalized.table.projects().len(),
        "normalized timesheet"
    );
    Ok(normalized)
}

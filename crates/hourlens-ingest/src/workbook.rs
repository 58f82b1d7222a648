//! Spreadsheet reader
//!
//! Reads the sheet named [`RAW_DATA_SHEET`] when present, otherwise the first
//! sheet. The first row is the header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::{IngestError, RawSheet, RawValue};

/// Sheet name exported timesheets conventionally use
pub const RAW_DATA_SHEET: &str = "Raw Data";

/// Read one sheet of an xlsx/xls/ods workbook
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawSheet, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        IngestError::Workbook(format!("failed to open {}: {e}", path.display()))
    })?;

    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound(wanted.to_string()))?,
        None => names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(RAW_DATA_SHEET))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| IngestError::Workbook("workbook has no sheets".into()))?,
    };
    tracing::debug!(sheet = %name, "reading worksheet");

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::Workbook(format!("failed to read sheet '{name}': {e}")))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(raw_value).collect()).collect();

    Ok(RawSheet { headers, rows })
}

fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                RawValue::Empty
            } else {
                RawValue::Text(s.clone())
            }
        }
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| RawValue::Number(dt.as_f64()), RawValue::DateTime),
        // Error cells and blanks
        _ => RawValue::Empty,
    }
}

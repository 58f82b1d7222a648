//! Time Series Normalizer
//!
//! Turns a raw sheet into the canonical [`TimeTable`]. Column names vary
//! between source revisions (`Hou`, `Project Name`, stray spaces, casing), so
//! headers are matched after collapsing whitespace and lowercasing.
//!
//! Row defects never fail the pass:
//! - unparsable dates drop the row and are counted in `dropped_rows`
//! - unparsable, negative or non-finite hours become `0.0` and are counted in
//!   `zeroed_hours`
//!
//! Later percentage computations rely on hours always being a number.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use hourlens_core::{Month, TimeEntry, TimeTable, MIN_YEAR};
use regex::Regex;

use crate::IngestError;

/// Headers accepted for each required column, already canonical
const DATE_ALIASES: &[&str] = &["date", "work date", "day"];
const PROJECT_ALIASES: &[&str] = &["project name", "project"];
const HOURS_ALIASES: &[&str] = &["hours", "hou", "hrs", "hour"];

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%d-%b-%Y"];
const TEXT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// A cell as read from the source, before interpretation
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// Header row plus data rows of one source sheet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

/// Positions of the required columns within a sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub project: usize,
    pub hours: usize,
}

impl ColumnMap {
    /// Locate the date, project and hours columns
    pub fn resolve(headers: &[String]) -> Result<Self, IngestError> {
        let canonical: Vec<String> = headers.iter().map(|h| canonical_header(h)).collect();
        let find = |column: &'static str, aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| canonical.iter().position(|h| h == alias))
                .ok_or_else(|| IngestError::MissingColumn {
                    column,
                    found: headers.join(", "),
                })
        };
        Ok(Self {
            date: find("Date", DATE_ALIASES)?,
            project: find("Project name", PROJECT_ALIASES)?,
            hours: find("Hours", HOURS_ALIASES)?,
        })
    }
}

/// Collapse inner whitespace, trim, lowercase
pub fn canonical_header(header: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    ws.replace_all(header.trim(), " ").to_lowercase()
}

/// Output of one normalization pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub table: TimeTable,
    /// Rows dropped because the date could not be parsed
    pub dropped_rows: usize,
    /// Rows dropped because the project label was blank
    pub unlabelled_rows: usize,
    /// Rows whose hours were replaced by zero
    pub zeroed_hours: usize,
}

impl Normalized {
    pub fn has_warnings(&self) -> bool {
        self.dropped_rows > 0 || self.unlabelled_rows > 0 || self.zeroed_hours > 0
    }
}

/// Normalize a raw sheet into a [`TimeTable`]
pub fn normalize(sheet: &RawSheet) -> Result<Normalized, IngestError> {
    let columns = ColumnMap::resolve(&sheet.headers)?;
    let mut out = Normalized::default();
    let mut entries = Vec::with_capacity(sheet.rows.len());

    for row in &sheet.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&RawValue::Empty);

        let Some(date) = parse_date(cell(columns.date)) else {
            out.dropped_rows += 1;
            continue;
        };
        let Some(project) = parse_project(cell(columns.project)) else {
            out.unlabelled_rows += 1;
            continue;
        };
        let hours = parse_hours(cell(columns.hours)).unwrap_or_else(|| {
            out.zeroed_hours += 1;
            0.0
        });

        let Some(month) = Month::from_number(date.month()) else {
            out.dropped_rows += 1;
            continue;
        };
        entries.push(TimeEntry::new(date.year(), month, project, hours));
    }

    if out.dropped_rows > 0 {
        tracing::warn!(rows = out.dropped_rows, "dropped rows with unparsable dates");
    }
    if out.unlabelled_rows > 0 {
        tracing::warn!(rows = out.unlabelled_rows, "dropped rows without a project label");
    }
    if out.zeroed_hours > 0 {
        tracing::warn!(rows = out.zeroed_hours, "replaced unparsable hours with zero");
    }

    out.table = TimeTable::new(entries);
    Ok(out)
}

/// Calendar date of a cell, if it is one and lies after [`MIN_YEAR`]
pub fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    let date = match value {
        RawValue::Date(d) => Some(*d),
        RawValue::DateTime(dt) => Some(dt.date()),
        RawValue::Number(serial) => excel_serial_date(*serial),
        RawValue::Text(text) => parse_text_date(text.trim()),
        RawValue::Empty => None,
    }?;
    (date.year() >= MIN_YEAR).then_some(date)
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
}

/// Excel's 1900 date system, with the leap-year bug folded into the epoch
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_project(value: &RawValue) -> Option<String> {
    let label = match value {
        RawValue::Text(text) => text.trim().to_string(),
        RawValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        RawValue::Number(n) => n.to_string(),
        RawValue::Date(_) | RawValue::DateTime(_) | RawValue::Empty => String::new(),
    };
    (!label.is_empty()).then_some(label)
}

/// Non-negative finite hours, or `None` when the cell must be zero-filled
pub fn parse_hours(value: &RawValue) -> Option<f64> {
    let hours = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(text) => {
            let text = text.trim();
            let text = if text.contains(',') && !text.contains('.') {
                text.replace(',', ".")
            } else {
                text.to_string()
            };
            text.parse::<f64>().ok()?
        }
        RawValue::Date(_) | RawValue::DateTime(_) | RawValue::Empty => return None,
    };
    (hours.is_finite() && hours >= 0.0).then_some(hours)
}

//! # hourlens-core
//!
//! Core domain model and traits for hourlens comparison reports.
//!
//! This crate provides:
//! - Domain types: `Month`, `TimeEntry`, `TimeTable`, `ComparisonSelection`
//! - Validated selections and mode-shaped results: `ValidSelection`, `ComparisonResult`
//! - Renderer-agnostic chart descriptors: `ChartSpec`
//! - Core traits: `ReportRenderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use hourlens_core::{ComparisonMode, ComparisonSelection, Month};
//!
//! let selection = ComparisonSelection::new(ComparisonMode::ProjectsInMonth)
//!     .year(2024)
//!     .month(Month::March)
//!     .project("Apollo")
//!     .project("Gemini");
//!
//! assert_eq!(selection.projects.len(), 2);
//! assert!(selection.months.contains(&Month::March));
//! ```

pub mod chart;
pub mod labels;
pub mod naming;
pub mod result;

pub use chart::{CategorySource, ChartKind, ChartSpec, SeriesSource, SeriesSpec};
pub use labels::{Labels, Locale};
pub use result::{
    Cell, Column, ColumnKey, ComparisonResult, EmptyResult, MonthlyPivot, PivotRow,
    ProjectTotal, ProjectTotals, ResultTable, RowKey, RowKind, TableRow, TimeBucket, TimeSeries,
    TimeSeriesRow,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Calendar
// ============================================================================

/// Earliest year accepted into a normalized table
pub const MIN_YEAR: i32 = 1900;

/// Canonical month. Ordering follows the calendar, not the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month from its 1-based calendar number
    pub fn from_number(number: u32) -> Option<Self> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// 1-based calendar number
    pub fn number(self) -> u32 {
        self as u32
    }

    /// Canonical English name
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Parse a full name or three-letter abbreviation, ignoring case and
    /// surrounding whitespace
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        if needle.len() < 3 {
            return None;
        }
        Self::ALL.into_iter().find(|m| {
            let name = m.name().to_ascii_lowercase();
            name == needle || (needle.len() == 3 && name.starts_with(&needle))
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::parse(s).ok_or_else(|| SelectionError::UnknownMonth(s.trim().to_string()))
    }
}

// ============================================================================
// Normalized Table
// ============================================================================

/// One row of the normalized timesheet table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub year: i32,
    pub month: Month,
    pub project: String,
    /// Non-negative, finite
    pub hours: f64,
}

impl TimeEntry {
    pub fn new(year: i32, month: Month, project: impl Into<String>, hours: f64) -> Self {
        Self {
            year,
            month,
            project: project.into(),
            hours,
        }
    }
}

/// Canonical table produced by one ingestion pass
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTable {
    entries: Vec<TimeEntry>,
}

impl TimeTable {
    pub fn new(entries: Vec<TimeEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct years, ascending
    pub fn years(&self) -> BTreeSet<i32> {
        self.entries.iter().map(|e| e.year).collect()
    }

    /// Distinct project identifiers, sorted
    pub fn projects(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.project.clone()).collect()
    }

    /// Months that have at least one entry in `year`, calendar order
    pub fn months_in(&self, year: i32) -> BTreeSet<Month> {
        self.entries
            .iter()
            .filter(|e| e.year == year)
            .map(|e| e.month)
            .collect()
    }

    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours).sum()
    }
}

impl FromIterator<TimeEntry> for TimeTable {
    fn from_iter<I: IntoIterator<Item = TimeEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Selection
// ============================================================================

/// The three fixed comparison strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Several projects within one month of one year
    ProjectsInMonth,
    /// Several projects across the months of one year
    ProjectsInYear,
    /// One project across several months or several years
    ProjectOverTime,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 3] = [
        ComparisonMode::ProjectsInMonth,
        ComparisonMode::ProjectsInYear,
        ComparisonMode::ProjectOverTime,
    ];

    /// Stable machine label
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::ProjectsInMonth => "projects-in-month",
            ComparisonMode::ProjectsInYear => "projects-in-year",
            ComparisonMode::ProjectOverTime => "project-over-time",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "projectsinmonth" | "projectinmonth" => Ok(ComparisonMode::ProjectsInMonth),
            "projectsinyear" | "projectinyear" => Ok(ComparisonMode::ProjectsInYear),
            "projectovertime" | "oneprojectovertime" => Ok(ComparisonMode::ProjectOverTime),
            _ => Err(SelectionError::UnknownMode(s.trim().to_string())),
        }
    }
}

/// Unvalidated user or config input for one report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSelection {
    pub mode: ComparisonMode,
    #[serde(default)]
    pub years: BTreeSet<i32>,
    #[serde(default)]
    pub months: BTreeSet<Month>,
    #[serde(default)]
    pub projects: BTreeSet<String>,
}

impl ComparisonSelection {
    pub fn new(mode: ComparisonMode) -> Self {
        Self {
            mode,
            years: BTreeSet::new(),
            months: BTreeSet::new(),
            projects: BTreeSet::new(),
        }
    }

    /// Add a year
    pub fn year(mut self, year: i32) -> Self {
        self.years.insert(year);
        self
    }

    /// Add a month
    pub fn month(mut self, month: Month) -> Self {
        self.months.insert(month);
        self
    }

    /// Add a project identifier
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.projects.insert(project.into());
        self
    }

    /// Labelled metadata lines: mode, years, months, projects
    pub fn metadata(&self, labels: &Labels) -> Vec<(String, String)> {
        let years = if self.years.is_empty() {
            labels.not_available.to_string()
        } else {
            join(self.years.iter())
        };
        let months = if self.months.is_empty() {
            labels.all.to_string()
        } else {
            join(self.months.iter())
        };
        let projects = if self.projects.is_empty() {
            labels.none.to_string()
        } else {
            join(self.projects.iter())
        };
        vec![
            (labels.metadata_mode.to_string(), labels.mode_name(self.mode).to_string()),
            (labels.metadata_years.to_string(), years),
            (labels.metadata_months.to_string(), months),
            (labels.metadata_projects.to_string(), projects),
        ]
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

/// Time axis of a one-project-over-time report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSpan {
    /// Several months of one year
    Months { year: i32, months: BTreeSet<Month> },
    /// Several whole years
    Years(BTreeSet<i32>),
}

/// A selection that passed validation, with the mode's dimensions made explicit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidSelection {
    ProjectsInMonth {
        year: i32,
        month: Month,
        projects: BTreeSet<String>,
    },
    ProjectsInYear {
        year: i32,
        projects: BTreeSet<String>,
    },
    ProjectOverTime {
        project: String,
        span: TimeSpan,
    },
}

impl ValidSelection {
    pub fn mode(&self) -> ComparisonMode {
        match self {
            ValidSelection::ProjectsInMonth { .. } => ComparisonMode::ProjectsInMonth,
            ValidSelection::ProjectsInYear { .. } => ComparisonMode::ProjectsInYear,
            ValidSelection::ProjectOverTime { .. } => ComparisonMode::ProjectOverTime,
        }
    }
}

/// Which part of a selection a rejection points at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionDimension {
    Mode,
    Years,
    Months,
    Projects,
}

/// Structured rejection of a selection
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select at least one project")]
    NoProjects,

    #[error("{mode}: select exactly one year (got {found})")]
    ExactlyOneYear { mode: ComparisonMode, found: usize },

    #[error("{mode}: select exactly one month (got {found})")]
    ExactlyOneMonth { mode: ComparisonMode, found: usize },

    #[error("{mode}: select at least two projects to compare (got {found})")]
    AtLeastTwoProjects { mode: ComparisonMode, found: usize },

    #[error("{mode}: do not select months, the report spans every month of the year (got {found})")]
    MonthsNotAllowed { mode: ComparisonMode, found: usize },

    #[error("project-over-time: select exactly one project (got {found})")]
    ExactlyOneProject { found: usize },

    #[error(
        "project-over-time: select one year with two or more months, \
         or two or more years with no months (got {years} years, {months} months)"
    )]
    InvalidTimeSpan { years: usize, months: usize },

    #[error("delta: reporting and baseline month must differ (both {0})")]
    SameMonth(Month),

    #[error("unknown comparison mode '{0}'")]
    UnknownMode(String),

    #[error("unknown month '{0}'")]
    UnknownMonth(String),
}

impl SelectionError {
    /// The selection dimension the UI should highlight
    pub fn dimension(&self) -> SelectionDimension {
        match self {
            SelectionError::NoProjects
            | SelectionError::AtLeastTwoProjects { .. }
            | SelectionError::ExactlyOneProject { .. } => SelectionDimension::Projects,
            SelectionError::ExactlyOneYear { .. } => SelectionDimension::Years,
            SelectionError::ExactlyOneMonth { .. }
            | SelectionError::MonthsNotAllowed { .. }
            | SelectionError::SameMonth(_)
            | SelectionError::UnknownMonth(_) => SelectionDimension::Months,
            SelectionError::InvalidTimeSpan { years, .. } => {
                if *years == 0 {
                    SelectionDimension::Years
                } else {
                    SelectionDimension::Months
                }
            }
            SelectionError::UnknownMode(_) => SelectionDimension::Mode,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Everything a renderer needs for one comparison report
#[derive(Clone, Debug)]
pub struct ComparisonReport {
    /// Selection as the user made it, for the metadata block
    pub selection: ComparisonSelection,
    pub result: ComparisonResult,
    pub chart: Option<ChartSpec>,
    pub labels: Labels,
    pub generated_on: NaiveDate,
}

impl ComparisonReport {
    /// Renderer-facing table for this report's result
    pub fn table(&self) -> ResultTable {
        self.result.table(&self.labels)
    }

    pub fn metadata(&self) -> Vec<(String, String)> {
        self.selection.metadata(&self.labels)
    }
}

/// Trait for report output encodings
pub trait ReportRenderer {
    type Output;

    /// Render a comparison report to the output format
    fn render(&self, report: &ComparisonReport) -> Result<Self::Output, RenderError>;
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_ordering_is_calendar() {
        let mut months = vec![Month::March, Month::January, Month::December, Month::February];
        months.sort();
        assert_eq!(
            months,
            vec![Month::January, Month::February, Month::March, Month::December]
        );
    }

    #[test]
    fn month_parsing_tolerates_case_and_whitespace() {
        assert_eq!(Month::parse("  january "), Some(Month::January));
        assert_eq!(Month::parse("SEP"), Some(Month::September));
        assert_eq!(Month::parse("Sept"), None);
        assert_eq!(Month::parse("ju"), None);
        assert!("Foo".parse::<Month>().is_err());
    }

    #[test]
    fn month_numbers_round_trip() {
        for month in Month::ALL {
            assert_eq!(Month::from_number(month.number()), Some(month));
        }
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn mode_parsing_accepts_label_variants() {
        assert_eq!(
            "projects-in-month".parse::<ComparisonMode>().unwrap(),
            ComparisonMode::ProjectsInMonth
        );
        assert_eq!(
            "Project_In_Year".parse::<ComparisonMode>().unwrap(),
            ComparisonMode::ProjectsInYear
        );
        assert_eq!(
            "one project over time".parse::<ComparisonMode>().unwrap(),
            ComparisonMode::ProjectOverTime
        );
        let err = "weekly".parse::<ComparisonMode>().unwrap_err();
        assert_eq!(err.dimension(), SelectionDimension::Mode);
    }

    #[test]
    fn table_helpers() {
        let table: TimeTable = vec![
            TimeEntry::new(2024, Month::March, "B", 1.0),
            TimeEntry::new(2024, Month::January, "A", 2.0),
            TimeEntry::new(2023, Month::May, "A", 3.5),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 3);
        assert_eq!(table.years().into_iter().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(
            table.months_in(2024).into_iter().collect::<Vec<_>>(),
            vec![Month::January, Month::March]
        );
        assert_eq!(table.projects().len(), 2);
        assert_eq!(table.total_hours(), 6.5);
    }

    #[test]
    fn metadata_fills_defaults() {
        let selection = ComparisonSelection::new(ComparisonMode::ProjectsInYear)
            .year(2024)
            .project("B")
            .project("A");
        let meta = selection.metadata(&Labels::english());
        assert_eq!(meta.len(), 4);
        assert_eq!(meta[0].1, "Compare Projects in a Year");
        assert_eq!(meta[1].1, "2024");
        assert_eq!(meta[2].1, "All");
        assert_eq!(meta[3].1, "A, B");
    }

    #[test]
    fn rejection_dimensions() {
        assert_eq!(SelectionError::NoProjects.dimension(), SelectionDimension::Projects);
        assert_eq!(
            SelectionError::MonthsNotAllowed {
                mode: ComparisonMode::ProjectsInYear,
                found: 1
            }
            .dimension(),
            SelectionDimension::Months
        );
        assert_eq!(
            SelectionError::InvalidTimeSpan { years: 0, months: 2 }.dimension(),
            SelectionDimension::Years
        );
    }
}

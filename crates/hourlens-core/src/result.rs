//! Mode-shaped comparison results
//!
//! A [`ComparisonResult`] is one of three table shapes (or an explicit empty
//! marker). Renderers never look at the shape directly: they ask for the
//! [`ResultTable`] layout, which fixes column order, headers and row kinds in
//! one place so that cell references built against it stay valid in every
//! output encoding.
//!
//! ```text
//! ProjectsInMonth     | Project Name | Total Hours |
//! ProjectsInYear      | Project Name | January | ... | December | Total Hours |   + Total row
//! OverTime (months)   | Month | Total Hours for <p> | Project Name |
//! OverTime (years)    | Year  | Total Hours for <p> | Project Name |
//! ```

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{ComparisonMode, Labels, Month};

// ============================================================================
// Shapes
// ============================================================================

/// Hours per project within one month
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotal {
    pub project: String,
    pub total_hours: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub year: i32,
    pub month: Month,
    /// Sorted by project name
    pub rows: Vec<ProjectTotal>,
}

/// Identity of a pivot row; the summary row carries its own marker
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKey {
    Project(String),
    Total,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub key: RowKey,
    /// One value per `MonthlyPivot::months` entry
    pub cells: Vec<f64>,
    pub total_hours: f64,
}

impl PivotRow {
    pub fn is_total(&self) -> bool {
        matches!(self.key, RowKey::Total)
    }

    pub fn project(&self) -> Option<&str> {
        match &self.key {
            RowKey::Project(name) => Some(name),
            RowKey::Total => None,
        }
    }
}

/// Projects × months of one year, zero-filled, with a trailing Total row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPivot {
    pub year: i32,
    /// Months present in the data, calendar order
    pub months: Vec<Month>,
    pub rows: Vec<PivotRow>,
}

impl MonthlyPivot {
    pub fn data_rows(&self) -> impl Iterator<Item = &PivotRow> {
        self.rows.iter().filter(|r| !r.is_total())
    }

    pub fn total_row(&self) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.is_total())
    }

    /// Hours for `project` in `month`, if both are part of the pivot
    pub fn cell(&self, project: &str, month: Month) -> Option<f64> {
        let col = self.months.iter().position(|m| *m == month)?;
        self.data_rows()
            .find(|r| r.project() == Some(project))
            .and_then(|r| r.cells.get(col).copied())
    }
}

/// A row's time bucket in an over-time report
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    Month(Month),
    Year(i32),
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Month(m) => write!(f, "{m}"),
            TimeBucket::Year(y) => write!(f, "{y}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub bucket: TimeBucket,
    pub total_hours: f64,
}

/// One project's hours per month or per year
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub project: String,
    /// Calendar order for months, ascending for years
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeries {
    pub fn by_month(&self) -> bool {
        matches!(self.rows.first(), Some(TimeSeriesRow { bucket: TimeBucket::Month(_), .. }))
    }

    pub fn by_year(&self) -> bool {
        matches!(self.rows.first(), Some(TimeSeriesRow { bucket: TimeBucket::Year(_), .. }))
    }
}

/// A valid selection that matched no timesheet rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResult {
    pub mode: ComparisonMode,
    pub reason: String,
}

/// Aggregate table for one comparison report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ComparisonResult {
    ProjectsInMonth(ProjectTotals),
    ProjectsInYear(MonthlyPivot),
    OverTime(TimeSeries),
    Empty(EmptyResult),
}

impl ComparisonResult {
    pub fn empty(mode: ComparisonMode, reason: impl Into<String>) -> Self {
        ComparisonResult::Empty(EmptyResult {
            mode,
            reason: reason.into(),
        })
    }

    /// Mode whose shape this result has
    pub fn mode(&self) -> ComparisonMode {
        match self {
            ComparisonResult::ProjectsInMonth(_) => ComparisonMode::ProjectsInMonth,
            ComparisonResult::ProjectsInYear(_) => ComparisonMode::ProjectsInYear,
            ComparisonResult::OverTime(_) => ComparisonMode::ProjectOverTime,
            ComparisonResult::Empty(e) => e.mode,
        }
    }

    /// Short shape name for diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            ComparisonResult::ProjectsInMonth(_) => "project totals",
            ComparisonResult::ProjectsInYear(_) => "monthly pivot",
            ComparisonResult::OverTime(s) if s.by_year() => "yearly series",
            ComparisonResult::OverTime(_) => "monthly series",
            ComparisonResult::Empty(_) => "empty",
        }
    }

    /// Explanation attached to an explicitly empty result
    pub fn empty_reason(&self) -> Option<&str> {
        match self {
            ComparisonResult::Empty(e) => Some(&e.reason),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Number of rows, the synthetic Total row included
    pub fn row_count(&self) -> usize {
        match self {
            ComparisonResult::ProjectsInMonth(t) => t.rows.len(),
            ComparisonResult::ProjectsInYear(p) => p.rows.len(),
            ComparisonResult::OverTime(s) => s.rows.len(),
            ComparisonResult::Empty(_) => 0,
        }
    }

    /// Copy of this result with every Total row removed. Idempotent.
    pub fn without_total(&self) -> ComparisonResult {
        match self {
            ComparisonResult::ProjectsInYear(pivot) => ComparisonResult::ProjectsInYear(MonthlyPivot {
                year: pivot.year,
                months: pivot.months.clone(),
                rows: pivot.data_rows().cloned().collect(),
            }),
            other => other.clone(),
        }
    }

    /// Lay the result out as a rectangular table
    pub fn table(&self, labels: &Labels) -> ResultTable {
        match self {
            ComparisonResult::ProjectsInMonth(totals) => ResultTable {
                columns: vec![
                    Column::new(ColumnKey::Project, labels.project_column),
                    Column::new(ColumnKey::TotalHours, labels.total_hours_column),
                ],
                rows: totals
                    .rows
                    .iter()
                    .map(|r| TableRow::data(vec![Cell::text(&r.project), Cell::Number(r.total_hours)]))
                    .collect(),
            },
            ComparisonResult::ProjectsInYear(pivot) => {
                let mut columns = vec![Column::new(ColumnKey::Project, labels.project_column)];
                columns.extend(
                    pivot
                        .months
                        .iter()
                        .map(|m| Column::new(ColumnKey::MonthHours(*m), m.name())),
                );
                columns.push(Column::new(ColumnKey::TotalHours, labels.total_hours_column));

                let rows = pivot
                    .rows
                    .iter()
                    .map(|r| {
                        let (kind, label) = match &r.key {
                            RowKey::Project(name) => (RowKind::Data, name.as_str()),
                            RowKey::Total => (RowKind::Total, labels.total),
                        };
                        let mut cells = Vec::with_capacity(r.cells.len() + 2);
                        cells.push(Cell::text(label));
                        cells.extend(r.cells.iter().map(|h| Cell::Number(*h)));
                        cells.push(Cell::Number(r.total_hours));
                        TableRow { kind, cells }
                    })
                    .collect();
                ResultTable { columns, rows }
            }
            ComparisonResult::OverTime(series) => {
                let bucket_column = if series.by_year() {
                    Column::new(ColumnKey::Year, labels.year_column)
                } else {
                    Column::new(ColumnKey::Month, labels.month_column)
                };
                let columns = vec![
                    bucket_column,
                    Column {
                        key: ColumnKey::TotalHours,
                        header: labels.total_hours_for(&series.project),
                    },
                    Column::new(ColumnKey::ProjectName, labels.project_column),
                ];
                let rows = series
                    .rows
                    .iter()
                    .map(|r| {
                        let bucket = match r.bucket {
                            TimeBucket::Month(m) => Cell::text(m.name()),
                            TimeBucket::Year(y) => Cell::Integer(i64::from(y)),
                        };
                        TableRow::data(vec![
                            bucket,
                            Cell::Number(r.total_hours),
                            Cell::text(&series.project),
                        ])
                    })
                    .collect();
                ResultTable { columns, rows }
            }
            ComparisonResult::Empty(empty) => ResultTable {
                columns: vec![Column::new(ColumnKey::Message, labels.message_column)],
                rows: vec![TableRow::data(vec![Cell::text(&empty.reason)])],
            },
        }
    }
}

// ============================================================================
// Table Layout
// ============================================================================

/// Semantic identity of a table column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Project,
    /// Pivot column holding one month's hours
    MonthHours(Month),
    /// Month bucket of an over-time table
    Month,
    /// Year bucket of an over-time table
    Year,
    TotalHours,
    /// Constant subject project of an over-time table
    ProjectName,
    Message,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: ColumnKey,
    pub header: String,
}

impl Column {
    pub fn new(key: ColumnKey, header: impl Into<String>) -> Self {
        Self {
            key,
            header: header.into(),
        }
    }
}

/// Marker separating data rows from the synthetic summary row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Data,
    Total,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Integer(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn data(cells: Vec<Cell>) -> Self {
        Self {
            kind: RowKind::Data,
            cells,
        }
    }

    pub fn is_total(&self) -> bool {
        self.kind == RowKind::Total
    }
}

/// Rectangular, renderer-facing layout of a result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn column_index(&self, key: ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Indices of pivot month columns, calendar order
    pub fn month_hour_columns(&self) -> Vec<usize> {
        let mut cols: Vec<(Month, usize)> = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c.key {
                ColumnKey::MonthHours(m) => Some((m, i)),
                _ => None,
            })
            .collect();
        cols.sort_by_key(|(m, _)| *m);
        cols.into_iter().map(|(_, i)| i).collect()
    }

    /// Indices of rows that are not synthetic summary rows
    pub fn data_row_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_total())
            .map(|(i, _)| i)
            .collect()
    }

    /// Span of data rows when they are contiguous
    pub fn data_row_span(&self) -> Option<Range<usize>> {
        let indices = self.data_row_indices();
        let first = *indices.first()?;
        let last = *indices.last()?;
        (last - first + 1 == indices.len()).then_some(first..last + 1)
    }

    /// Copy with summary rows removed. Idempotent.
    pub fn without_total(&self) -> ResultTable {
        ResultTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| !r.is_total()).cloned().collect(),
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(column)
    }

    pub fn header(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(|c| c.header.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pivot() -> ComparisonResult {
        ComparisonResult::ProjectsInYear(MonthlyPivot {
            year: 2024,
            months: vec![Month::January, Month::February],
            rows: vec![
                PivotRow {
                    key: RowKey::Project("A".into()),
                    cells: vec![10.0, 5.0],
                    total_hours: 15.0,
                },
                PivotRow {
                    key: RowKey::Project("B".into()),
                    cells: vec![3.0, 7.0],
                    total_hours: 10.0,
                },
                PivotRow {
                    key: RowKey::Total,
                    cells: vec![13.0, 12.0],
                    total_hours: 25.0,
                },
            ],
        })
    }

    #[test]
    fn pivot_table_layout() {
        let table = pivot().table(&Labels::english());
        let headers: Vec<_> = table.columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Project Name", "January", "February", "Total Hours"]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[2].is_total());
        assert_eq!(table.rows[2].cells[0], Cell::text("Total"));
        assert_eq!(table.month_hour_columns(), vec![1, 2]);
        assert_eq!(table.data_row_span(), Some(0..2));
    }

    #[test]
    fn total_row_uses_localized_label_but_keeps_marker() {
        let table = pivot().table(&Labels::vietnamese());
        assert_eq!(table.rows[2].cells[0], Cell::text("Tổng"));
        assert_eq!(table.rows[2].kind, RowKind::Total);
        assert_eq!(table.data_row_indices(), vec![0, 1]);
    }

    #[test]
    fn dropping_total_is_idempotent() {
        let once = pivot().without_total();
        let twice = once.without_total();
        assert_eq!(once, twice);
        assert_eq!(once.row_count(), 2);

        let table = pivot().table(&Labels::english());
        assert_eq!(table.without_total(), table.without_total().without_total());
    }

    #[test]
    fn pivot_cell_lookup() {
        let ComparisonResult::ProjectsInYear(p) = pivot() else {
            unreachable!()
        };
        assert_eq!(p.cell("B", Month::February), Some(7.0));
        assert_eq!(p.cell("B", Month::March), None);
        assert_eq!(p.cell("Total", Month::January), None);
        assert_eq!(p.total_row().map(|r| r.total_hours), Some(25.0));
    }

    #[test]
    fn over_time_table_names_hours_column_after_project() {
        let result = ComparisonResult::OverTime(TimeSeries {
            project: "X".into(),
            rows: vec![
                TimeSeriesRow {
                    bucket: TimeBucket::Year(2023),
                    total_hours: 12.0,
                },
                TimeSeriesRow {
                    bucket: TimeBucket::Year(2024),
                    total_hours: 9.0,
                },
            ],
        });
        let table = result.table(&Labels::english());
        assert_eq!(table.columns[0].key, ColumnKey::Year);
        assert_eq!(table.columns[1].header, "Total Hours for X");
        assert_eq!(table.cell(1, 0), Some(&Cell::Integer(2024)));
        assert_eq!(table.cell(0, 2), Some(&Cell::text("X")));
        assert_eq!(result.shape_name(), "yearly series");
    }

    #[test]
    fn empty_result_carries_reason() {
        let result = ComparisonResult::empty(ComparisonMode::ProjectsInMonth, "no rows for 2024");
        assert!(result.is_empty());
        assert_eq!(result.empty_reason(), Some("no rows for 2024"));
        let table = result.table(&Labels::english());
        assert_eq!(table.columns[0].key, ColumnKey::Message);
        assert_eq!(table.cell(0, 0), Some(&Cell::text("no rows for 2024")));
    }
}

//! Renderer-agnostic chart descriptors
//!
//! A [`ChartSpec`] never holds values. Categories and series point into the
//! [`ResultTable`] by cell range, the same way a spreadsheet chart points
//! into its worksheet; each renderer resolves the references against the
//! table it wrote.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Cell, ResultTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Where category labels come from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategorySource {
    /// A vertical run of cells in one column
    ColumnCells { column: usize, rows: Range<usize> },
    /// Column headers (used for pivot month columns)
    HeaderCells { columns: Vec<usize> },
}

/// Where a series' values come from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesSource {
    /// A vertical run of cells in one column
    ColumnCells { column: usize, rows: Range<usize> },
    /// A horizontal run of cells in one row
    RowCells { row: usize, columns: Vec<usize> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub label: String,
    pub source: SeriesSource,
}

/// Abstract description of what to plot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub categories: CategorySource,
    pub series: Vec<SeriesSpec>,
    /// Project the whole chart is about, for page captions
    pub subject: Option<String>,
}

impl ChartSpec {
    pub fn category_count(&self) -> usize {
        match &self.categories {
            CategorySource::ColumnCells { rows, .. } => rows.len(),
            CategorySource::HeaderCells { columns } => columns.len(),
        }
    }

    /// Check every reference against the table bounds
    pub fn fits(&self, table: &ResultTable) -> bool {
        let width = table.columns.len();
        let height = table.rows.len();
        let categories_fit = match &self.categories {
            CategorySource::ColumnCells { column, rows } => *column < width && rows.end <= height,
            CategorySource::HeaderCells { columns } => columns.iter().all(|c| *c < width),
        };
        categories_fit
            && self.series.iter().all(|s| match &s.source {
                SeriesSource::ColumnCells { column, rows } => *column < width && rows.end <= height,
                SeriesSource::RowCells { row, columns } => {
                    *row < height && columns.iter().all(|c| *c < width)
                }
            })
    }

    /// Category labels resolved against `table`
    pub fn category_labels(&self, table: &ResultTable) -> Vec<String> {
        match &self.categories {
            CategorySource::ColumnCells { column, rows } => rows
                .clone()
                .filter_map(|r| table.cell(r, *column).map(Cell::to_string))
                .collect(),
            CategorySource::HeaderCells { columns } => columns
                .iter()
                .filter_map(|c| table.header(*c).map(str::to_string))
                .collect(),
        }
    }
}

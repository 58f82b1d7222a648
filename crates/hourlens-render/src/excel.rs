//! Excel comparison report renderer
//!
//! Writes one worksheet per report:
//!
//! ```text
//! A1  | Project Name | January | February | Total Hours |
//!     | Apollo       | 10      | 5        | 15          |
//!     | Gemini       | 3       | 7        | 10          |
//!     | Total        | 13      | 12       | 25          |   (bold)
//!     (two blank rows)
//!     | Comparison Report |
//!     | Comparison Mode   | Compare Projects in a Year |
//!     | Years             | 2024 |
//!     | Months            | All  |
//!     | Projects          | Apollo, Gemini |
//!     (one blank row)
//!     [native chart]
//! ```
//!
//! The chart is a native Excel chart whose categories, values and series
//! names are cell ranges on this sheet, so editing the table updates the
//! chart. A chart that cannot be expressed as ranges is left out and the
//! workbook is still written.

use hourlens_core::naming::sanitize_filename;
use hourlens_core::{
    CategorySource, Cell, ChartKind, ChartSpec, ComparisonReport, RenderError, ReportRenderer,
    ResultTable, RowKind, SeriesSource,
};
use rust_xlsxwriter::{Chart, ChartType, Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

/// First sheet row of the table (header row)
const TABLE_ROW: u32 = 0;
const TABLE_COL: u16 = 0;
/// Blank rows between the table and the metadata block
const METADATA_GAP: u32 = 2;
/// Blank rows between the metadata block and the chart
const CHART_GAP: u32 = 1;

/// Excel comparison report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Worksheet name; the locale's default when unset
    pub sheet_name: Option<String>,
    /// Number format for hour cells
    pub hours_format: String,
    /// Chart size in pixels
    pub chart_size: (u32, u32),
    /// Whether to attach the native chart
    pub include_chart: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_name: None,
            hours_format: "#,##0.00".into(),
            chart_size: (720, 420),
            include_chart: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worksheet name (sanitized on write)
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Set the number format for hour cells
    pub fn hours_format(mut self, format: impl Into<String>) -> Self {
        self.hours_format = format.into();
        self
    }

    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width, height);
        self
    }

    /// Write the table and metadata only
    pub fn no_chart(mut self) -> Self {
        self.include_chart = false;
        self
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, report: &ComparisonReport) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();
        let table = report.table();

        let sheet_name = sanitize_filename(
            self.sheet_name
                .as_deref()
                .unwrap_or(report.labels.sheet_name),
        );
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&sheet_name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let last_table_row = Self::write_table(sheet, &table, &formats)?;
        let metadata_row = last_table_row + METADATA_GAP + 1;
        let last_metadata_row = Self::write_metadata(sheet, report, metadata_row, &formats)?;

        if self.include_chart {
            if let Some(spec) = &report.chart {
                let anchor = last_metadata_row + CHART_GAP + 1;
                self.attach_chart(sheet, spec, &table, &sheet_name, anchor);
            }
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        tracing::debug!(bytes = buffer.len(), sheet = %sheet_name, "rendered workbook");
        Ok(buffer)
    }

    fn create_formats(&self) -> ExcelFormats {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(Color::White)
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let hours = Format::new()
            .set_num_format(&self.hours_format)
            .set_border(FormatBorder::Thin);

        let integer = Format::new().set_num_format("0").set_border(FormatBorder::Thin);

        let total_text = Format::new()
            .set_bold()
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        let total_hours = Format::new()
            .set_bold()
            .set_num_format(&self.hours_format)
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        let label = Format::new().set_bold();

        ExcelFormats {
            header,
            text,
            hours,
            integer,
            total_text,
            total_hours,
            label,
        }
    }

    /// Write header and rows at the anchor; returns the last sheet row used
    fn write_table(
        sheet: &mut Worksheet,
        table: &ResultTable,
        formats: &ExcelFormats,
    ) -> Result<u32, RenderError> {
        for (col, column) in table.columns.iter().enumerate() {
            sheet
                .write_string_with_format(TABLE_ROW, TABLE_COL + col as u16, &column.header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let sheet_row = table_row(i);
            let total = row.kind == RowKind::Total;
            for (col, cell) in row.cells.iter().enumerate() {
                let col = TABLE_COL + col as u16;
                match cell {
                    Cell::Text(text) => {
                        let format = if total { &formats.total_text } else { &formats.text };
                        sheet.write_string_with_format(sheet_row, col, text, format)
                    }
                    Cell::Number(hours) => {
                        let format = if total { &formats.total_hours } else { &formats.hours };
                        sheet.write_number_with_format(sheet_row, col, *hours, format)
                    }
                    Cell::Integer(value) => {
                        sheet.write_number_with_format(sheet_row, col, *value as f64, &formats.integer)
                    }
                }
                .map_err(|e| RenderError::Format(e.to_string()))?;
            }
        }

        for (col, width) in column_widths(table).into_iter().enumerate() {
            sheet.set_column_width(TABLE_COL + col as u16, width).ok();
        }

        Ok(TABLE_ROW + table.rows.len() as u32)
    }

    /// Write the labelled metadata block; returns the last sheet row used
    fn write_metadata(
        sheet: &mut Worksheet,
        report: &ComparisonReport,
        start: u32,
        formats: &ExcelFormats,
    ) -> Result<u32, RenderError> {
        sheet
            .write_string_with_format(start, TABLE_COL, report.labels.metadata_title, &formats.label)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let mut row = start;
        for (label, value) in report.metadata() {
            row += 1;
            sheet
                .write_string_with_format(row, TABLE_COL, &label, &formats.label)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_string(row, TABLE_COL + 1, &value)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        Ok(row)
    }

    /// Insert the native chart; any problem leaves the sheet chartless
    fn attach_chart(
        &self,
        sheet: &mut Worksheet,
        spec: &ChartSpec,
        table: &ResultTable,
        sheet_name: &str,
        anchor: u32,
    ) {
        if !spec.fits(table) {
            tracing::warn!(title = %spec.title, "chart references fall outside the table, skipping chart");
            return;
        }
        let Some(mut chart) = native_chart(spec, sheet_name) else {
            tracing::warn!(title = %spec.title, "chart ranges are not contiguous, skipping chart");
            return;
        };
        chart.set_width(self.chart_size.0).set_height(self.chart_size.1);

        if let Err(e) = sheet.insert_chart(anchor, TABLE_COL, &chart) {
            tracing::warn!(error = %e, "failed to insert chart, writing workbook without it");
        }
    }
}

impl ReportRenderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &ComparisonReport) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

/// Reusable cell formats
struct ExcelFormats {
    header: Format,
    text: Format,
    hours: Format,
    integer: Format,
    total_text: Format,
    total_hours: Format,
    label: Format,
}

/// Sheet row of table row `i`
fn table_row(i: usize) -> u32 {
    TABLE_ROW + 1 + i as u32
}

fn sheet_col(column: usize) -> u16 {
    TABLE_COL + column as u16
}

/// Bounds of a run of adjacent columns
fn contiguous(columns: &[usize]) -> Option<(u16, u16)> {
    let first = *columns.first()?;
    let last = *columns.last()?;
    columns
        .windows(2)
        .all(|w| w[1] == w[0] + 1)
        .then(|| (sheet_col(first), sheet_col(last)))
}

/// Build a range-bound chart, or `None` when a reference is not a single range
fn native_chart(spec: &ChartSpec, sheet_name: &str) -> Option<Chart> {
    let chart_type = match spec.kind {
        ChartKind::Bar => ChartType::Column,
        ChartKind::Line => ChartType::Line,
    };
    let mut chart = Chart::new(chart_type);
    chart.title().set_name(spec.title.as_str());
    chart.x_axis().set_name(spec.x_axis.as_str());
    chart.y_axis().set_name(spec.y_axis.as_str());

    let categories = match &spec.categories {
        CategorySource::ColumnCells { column, rows } if !rows.is_empty() => (
            table_row(rows.start),
            sheet_col(*column),
            table_row(rows.end - 1),
            sheet_col(*column),
        ),
        CategorySource::HeaderCells { columns } => {
            let (first, last) = contiguous(columns)?;
            (TABLE_ROW, first, TABLE_ROW, last)
        }
        CategorySource::ColumnCells { .. } => return None,
    };

    for series in &spec.series {
        // Series names reference the header or the row label cell
        let (name, values) = match &series.source {
            SeriesSource::ColumnCells { column, rows } if !rows.is_empty() => (
                (TABLE_ROW, sheet_col(*column)),
                (
                    table_row(rows.start),
                    sheet_col(*column),
                    table_row(rows.end - 1),
                    sheet_col(*column),
                ),
            ),
            SeriesSource::RowCells { row, columns } => {
                let (first, last) = contiguous(columns)?;
                ((table_row(*row), TABLE_COL), (table_row(*row), first, table_row(*row), last))
            }
            SeriesSource::ColumnCells { .. } => return None,
        };
        chart
            .add_series()
            .set_name((sheet_name, name.0, name.1))
            .set_categories((sheet_name, categories.0, categories.1, categories.2, categories.3))
            .set_values((sheet_name, values.0, values.1, values.2, values.3));
    }

    if spec.series.len() < 2 {
        chart.legend().set_hidden();
    }
    Some(chart)
}

/// Character-based widths, clamped to a readable range
fn column_widths(table: &ResultTable) -> Vec<f64> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(col, column)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|r| r.cells.get(col))
                .map(|c| c.to_string().chars().count())
                .chain(std::iter::once(column.header.chars().count()))
                .max()
                .unwrap_or(8);
            (longest as f64 + 2.0).clamp(10.0, 50.0)
        })
        .collect()
}

//! Chart rasterization
//!
//! The document renderer cannot embed a native chart, so it plots the chart
//! itself. Plot data is re-read from the result table rather than trusted
//! from the chart spec: summary rows are skipped here again, by row marker.

use std::path::{Path, PathBuf};

use hourlens_core::{CategorySource, ChartKind, ChartSpec, RenderError, ResultTable, SeriesSource};
use image::DynamicImage;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

/// Default bitmap size in pixels
pub const RASTER_SIZE: (u32, u32) = (2400, 1400);

const FONT: &str = "sans-serif";

#[derive(Clone, Debug, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Concrete values for one chart, resolved from a table
#[derive(Clone, Debug, PartialEq)]
pub struct PlotData {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub categories: Vec<String>,
    pub series: Vec<PlotSeries>,
}

impl PlotData {
    /// Resolve `spec` against `table`, skipping summary rows
    ///
    /// Returns `None` when nothing plottable remains.
    pub fn from_spec(spec: &ChartSpec, table: &ResultTable) -> Option<Self> {
        let is_data_row = |r: &usize| table.rows.get(*r).is_some_and(|row| !row.is_total());

        let categories: Vec<String> = match &spec.categories {
            CategorySource::ColumnCells { column, rows } => rows
                .clone()
                .filter(is_data_row)
                .map(|r| table.cell(r, *column).map(ToString::to_string).unwrap_or_default())
                .collect(),
            CategorySource::HeaderCells { columns } => columns
                .iter()
                .map(|c| table.header(*c).unwrap_or_default().to_string())
                .collect(),
        };

        let series: Vec<PlotSeries> = spec
            .series
            .iter()
            .filter_map(|s| {
                let values: Vec<f64> = match &s.source {
                    SeriesSource::ColumnCells { column, rows } => rows
                        .clone()
                        .filter(is_data_row)
                        .map(|r| table.cell(r, *column).and_then(|c| c.as_number()).unwrap_or(0.0))
                        .collect(),
                    SeriesSource::RowCells { row, columns } => {
                        if !is_data_row(row) {
                            return None;
                        }
                        columns
                            .iter()
                            .map(|c| table.cell(*row, *c).and_then(|c| c.as_number()).unwrap_or(0.0))
                            .collect()
                    }
                };
                (!values.is_empty()).then(|| PlotSeries {
                    label: s.label.clone(),
                    values,
                })
            })
            .collect();

        if categories.is_empty() || series.is_empty() {
            return None;
        }
        Some(Self {
            kind: spec.kind,
            title: spec.title.clone(),
            x_axis: spec.x_axis.clone(),
            y_axis: spec.y_axis.clone(),
            categories,
            series,
        })
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Rasterizes plot data through a scratch PNG that never outlives the call
#[derive(Clone, Debug)]
pub struct ChartRaster {
    pub size: (u32, u32),
    /// Parent for the scratch directory; the system temp dir when unset
    pub scratch_parent: Option<PathBuf>,
}

impl Default for ChartRaster {
    fn default() -> Self {
        Self {
            size: RASTER_SIZE,
            scratch_parent: None,
        }
    }
}

impl ChartRaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn scratch_in(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    /// Draw `data` and load the bitmap back
    ///
    /// The scratch directory is removed when this returns, on success and
    /// on every error path.
    pub fn render(&self, data: &PlotData) -> Result<DynamicImage, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("hourlens-chart-");
        let scratch = match &self.scratch_parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let path = scratch.path().join("chart.png");

        rasterize(data, &path, self.size)?;
        let image = image::open(&path)
            .map_err(|e| RenderError::Chart(format!("failed to load rasterized chart: {e}")))?;

        tracing::debug!(size = ?self.size, title = %data.title, "rasterized chart");
        Ok(image)
    }
}

fn chart_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Chart(e.to_string())
}

/// Upper bound of the value axis with some headroom
fn axis_max(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.15
    }
}

fn category_label(categories: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            categories.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Draw `data` as a PNG at `path`
pub fn rasterize(data: &PlotData, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let n = data.categories.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(&data.title, (FONT, 64))
        .margin(48)
        .x_label_area_size(160)
        .y_label_area_size(180)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..axis_max(data.max_value()))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(data.x_axis.as_str())
        .y_desc(data.y_axis.as_str())
        .axis_desc_style((FONT, 40))
        .label_style((FONT, 32))
        .x_label_formatter(&|v| category_label(&data.categories, v))
        .draw()
        .map_err(chart_error)?;

    for (i, series) in data.series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        match data.kind {
            ChartKind::Bar => {
                chart
                    .draw_series(
                        Histogram::vertical(&chart)
                            .style(color.filled())
                            .margin(24)
                            .data(series.values.iter().enumerate().map(|(x, y)| (x, *y))),
                    )
                    .map_err(chart_error)?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 10), (x + 20, y + 10)], color.filled()));
            }
            ChartKind::Line => {
                let points: Vec<(SegmentValue<usize>, f64)> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(x, y)| (SegmentValue::CenterOf(x), *y))
                    .collect();
                chart
                    .draw_series(LineSeries::new(points.clone(), color.stroke_width(4)))
                    .map_err(chart_error)?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(4)));
                chart
                    .draw_series(points.into_iter().map(|p| Circle::new(p, 10, color.filled())))
                    .map_err(chart_error)?;
            }
        }
    }

    if data.series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font((FONT, 32))
            .draw()
            .map_err(chart_error)?;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}

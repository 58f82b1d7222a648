//! # hourlens-render
//!
//! Output encodings for hourlens comparison reports.
//!
//! This crate provides:
//! - Excel workbooks with the result table, a metadata block and a native
//!   chart bound to the table's cell ranges
//! - PDF documents with branding, metadata and a rasterized chart page
//! - Chart rasterization to bitmaps
//!
//! Both renderers return in-memory buffers; the caller decides where they go.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hourlens_core::ReportRenderer;
//! use hourlens_render::{DocumentRenderer, ExcelRenderer};
//!
//! // `report` comes from hourlens_engine::ComparisonEngine::run
//! let xlsx = ExcelRenderer::new().render(&report)?;
//! let pdf = DocumentRenderer::new()
//!     .title("ACME Engineering - Hours")
//!     .logo("assets/logo.png")
//!     .render(&report)?;
//!
//! std::fs::write("comparison.xlsx", xlsx)?;
//! std::fs::write("comparison.pdf", pdf)?;
//! ```

pub mod document;
pub mod excel;
pub mod raster;

pub use document::{Branding, DocumentRenderer};
pub use excel::ExcelRenderer;
pub use raster::{ChartRaster, PlotData, PlotSeries, RASTER_SIZE};

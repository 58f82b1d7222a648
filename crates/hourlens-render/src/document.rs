//! PDF comparison report renderer
//!
//! Page 1 carries the optional logo, the title, the generation date and the
//! metadata block, continuing on further pages when the block is too long.
//! The next page carries the rasterized chart under its title, with
//! the subject project as a caption for single-project reports. A report
//! without a chart gets a notice after the metadata instead.
//!
//! Chart and logo problems only cost the image; the document is still
//! produced. Only PDF serialization errors are returned.

use std::path::PathBuf;

use hourlens_core::{ChartSpec, ComparisonReport, RenderError, ReportRenderer, ResultTable};
use image::{DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

use crate::raster::{ChartRaster, PlotData};

/// A4 portrait, millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LOGO_WIDTH: f32 = 40.0;
const CHART_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Characters per metadata line at 11pt
const WRAP_CHARS: usize = 90;
const PT_TO_MM: f32 = 0.3528;

/// Title and logo shown on the first page
#[derive(Clone, Debug, Default)]
pub struct Branding {
    /// Overrides the locale's report title
    pub title: Option<String>,
    pub logo: Option<PathBuf>,
}

/// PDF comparison report renderer
#[derive(Clone, Debug, Default)]
pub struct DocumentRenderer {
    pub branding: Branding,
    pub raster: ChartRaster,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.branding.title = Some(title.into());
        self
    }

    pub fn logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.branding.logo = Some(path.into());
        self
    }

    /// Create the chart scratch directory under `parent`
    pub fn scratch_in(mut self, parent: impl Into<PathBuf>) -> Self {
        self.raster = self.raster.scratch_in(parent);
        self
    }

    pub fn raster_size(mut self, width: u32, height: u32) -> Self {
        self.raster = self.raster.size(width, height);
        self
    }

    /// Generate PDF bytes
    pub fn render_to_bytes(&self, report: &ComparisonReport) -> Result<Vec<u8>, RenderError> {
        let labels = &report.labels;
        let table = report.table();
        let chart = report
            .chart
            .as_ref()
            .and_then(|spec| self.chart_image(spec, &table).map(|image| (spec, image)));

        let title = self
            .branding
            .title
            .clone()
            .unwrap_or_else(|| labels.report_title.to_string());

        let (doc, page, layer) = PdfDocument::new(
            pdf_text(&title),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
        };

        // Page 1: branding and metadata
        let cover = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;
        if let Some(logo) = self.logo_image() {
            y = place_image(&cover, &logo, MARGIN, y, LOGO_WIDTH) - 8.0;
        }
        centered(&cover, &title, 20.0, y, &fonts.bold);
        y -= 10.0;
        let generated = format!(
            "{}: {}",
            labels.generated_on,
            report.generated_on.format("%Y-%m-%d")
        );
        centered(&cover, &generated, 11.0, y, &fonts.regular);
        y -= 16.0;

        let mut flow = Flow {
            doc: &doc,
            layer: cover,
            y,
        };
        flow.line(labels.metadata_title, 14.0, 0.0, 9.0, &fonts.bold);
        for (label, value) in report.metadata() {
            for (i, line) in wrap(&format!("{label}: {value}"), WRAP_CHARS).iter().enumerate() {
                let indent = if i == 0 { 0.0 } else { 6.0 };
                flow.line(line, 11.0, indent, 6.5, &fonts.regular);
            }
        }
        if let Some(reason) = report.result.empty_reason() {
            flow.skip(4.0);
            flow.line(&format!("{}: {reason}", labels.no_data), 11.0, 0.0, 6.5, &fonts.regular);
        }

        match chart {
            None => {
                flow.skip(8.0);
                flow.line(labels.no_chart, 12.0, 0.0, 8.0, &fonts.bold);
            }
            Some((spec, image)) => {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Chart");
                let chart_page = doc.get_page(page).get_layer(layer);
                let mut y = PAGE_HEIGHT - MARGIN;
                if let Some(subject) = &spec.subject {
                    let caption = format!("{}: {subject}", labels.project_caption);
                    chart_page.use_text(pdf_text(&caption), 13.0, Mm(MARGIN), Mm(y), &fonts.bold);
                    y -= 12.0;
                }
                centered(&chart_page, &spec.title, 16.0, y, &fonts.bold);
                y -= 8.0;
                place_image(&chart_page, &image, MARGIN, y, CHART_WIDTH);
            }
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        tracing::debug!(bytes = bytes.len(), "rendered document");
        Ok(bytes)
    }

    /// Rasterize the chart, or `None` when there is nothing to draw or drawing failed
    fn chart_image(&self, spec: &ChartSpec, table: &ResultTable) -> Option<DynamicImage> {
        let Some(data) = PlotData::from_spec(spec, table) else {
            tracing::debug!(title = %spec.title, "chart has no plottable rows");
            return None;
        };
        match self.raster.render(&data) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "chart rasterization failed, rendering document without chart");
                None
            }
        }
    }

    fn logo_image(&self) -> Option<DynamicImage> {
        let path = self.branding.logo.as_ref()?;
        match image::open(path) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load logo, skipping it");
                None
            }
        }
    }
}

impl ReportRenderer for DocumentRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &ComparisonReport) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

/// Top-down text cursor; continues on a new page below the bottom margin
struct Flow<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Flow<'_> {
    fn line(&mut self, text: &str, size: f32, indent: f32, step: f32, font: &IndirectFontRef) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Continued");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer
            .use_text(pdf_text(text), size, Mm(MARGIN + indent), Mm(self.y), font);
        self.y -= step;
    }

    fn skip(&mut self, height: f32) {
        self.y -= height;
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Format(format!("Failed to create PDF: {e}"))
}

/// Place `image` scaled to `width` mm with its top edge at `top`; returns the bottom edge
fn place_image(layer: &PdfLayerReference, image: &DynamicImage, x: f32, top: f32, width: f32) -> f32 {
    let (px_width, px_height) = image.dimensions();
    let dpi = px_width as f32 * 25.4 / width;
    let height = px_height as f32 * 25.4 / dpi;
    let bottom = top - height;

    // Alpha channels are flattened; PDF image masks are not emitted
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(bottom)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    bottom
}

/// Approximate horizontal centering for Helvetica
fn centered(layer: &PdfLayerReference, text: &str, size: f32, y: f32, font: &IndirectFontRef) {
    let text = pdf_text(text);
    let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
    let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

/// Greedy word wrap on character count
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Fold text into what the builtin (WinAnsi) fonts can show
///
/// Latin-1 passes through; Vietnamese letters lose their extra marks.
pub fn pdf_text(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let code = c as u32;
    if code <= 0xFF {
        return c;
    }
    let upper = match code {
        0x0102 | 0x0103 => 'A',
        0x0110 | 0x0111 => 'D',
        0x0128 | 0x0129 => 'I',
        0x0168 | 0x0169 => 'U',
        0x01A0 | 0x01A1 => 'O',
        0x01AF | 0x01B0 => 'U',
        // Latin Extended Additional: upper/lower pairs per base vowel
        0x1EA0..=0x1EB7 => 'A',
        0x1EB8..=0x1EC7 => 'E',
        0x1EC8..=0x1ECB => 'I',
        0x1ECC..=0x1EE3 => 'O',
        0x1EE4..=0x1EF1 => 'U',
        0x1EF2..=0x1EF9 => 'Y',
        _ => return '?',
    };
    let lower = match code {
        0x0103 | 0x0111 | 0x0129 | 0x0169 | 0x01A1 | 0x01B0 => true,
        0x0102 | 0x0110 | 0x0128 | 0x0168 | 0x01A0 | 0x01AF => false,
        _ => code >= 0x1EA0 && code % 2 == 1,
    };
    if lower {
        upper.to_ascii_lowercase()
    } else {
        upper
    }
}

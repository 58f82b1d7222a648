//! Integration tests for report rendering

use std::fs;
use std::io::{Cursor, Read};

use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use hourlens_core::{
    ComparisonMode, ComparisonReport, ComparisonResult, ComparisonSelection, Labels, Month,
    ReportRenderer, TimeEntry, TimeTable,
};
use hourlens_engine::{ComparisonEngine, ComparisonOutcome};
use hourlens_render::{DocumentRenderer, ExcelRenderer};
use tempfile::tempdir;

fn timesheet() -> TimeTable {
    TimeTable::new(vec![
        TimeEntry::new(2024, Month::January, "Apollo", 10.0),
        TimeEntry::new(2024, Month::February, "Apollo", 5.0),
        TimeEntry::new(2024, Month::January, "Gemini", 3.0),
        TimeEntry::new(2024, Month::February, "Gemini", 7.0),
    ])
}

fn run(table: &TimeTable, selection: &ComparisonSelection, labels: Labels) -> ComparisonReport {
    let engine = ComparisonEngine::new(labels)
        .generated_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    match engine.run(table, selection) {
        ComparisonOutcome::Report(report) => report,
        other => panic!("expected a report, got {other:?}"),
    }
}

fn report(labels: Labels) -> ComparisonReport {
    let selection = ComparisonSelection::new(ComparisonMode::ProjectsInYear)
        .year(2024)
        .project("Apollo")
        .project("Gemini");
    run(&timesheet(), &selection, labels)
}

fn over_time_report() -> ComparisonReport {
    let selection = ComparisonSelection::new(ComparisonMode::ProjectOverTime)
        .year(2024)
        .month(Month::January)
        .month(Month::February)
        .project("Apollo");
    run(&timesheet(), &selection, Labels::english())
}

fn sheet(bytes: Vec<u8>, name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("readable workbook");
    workbook.worksheet_range(name).expect("sheet exists")
}

fn text_at(range: &Range<Data>, row: u32, col: u32) -> String {
    range
        .get_value((row, col))
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn chart_xml(bytes: Vec<u8>) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("xlsx is a zip archive");
    let mut xml = String::new();
    archive
        .by_name("xl/charts/chart1.xml")
        .expect("workbook has a chart part")
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

/// Text and operators of one PDF page's content stream
struct PdfPage {
    text: String,
    operators: Vec<String>,
}

fn pdf_pages(bytes: &[u8]) -> Vec<PdfPage> {
    let doc = lopdf::Document::load_mem(bytes).expect("parsable PDF");
    doc.get_pages()
        .values()
        .map(|id| {
            let raw = doc.get_page_content(*id).unwrap();
            let content = lopdf::content::Content::decode(&raw).unwrap();
            let mut page = PdfPage {
                text: String::new(),
                operators: Vec::new(),
            };
            for op in &content.operations {
                page.operators.push(op.operator.clone());
                for operand in &op.operands {
                    collect_strings(operand, &mut page.text);
                }
            }
            page
        })
        .collect()
}

fn collect_strings(object: &lopdf::Object, out: &mut String) {
    match object {
        lopdf::Object::String(bytes, _) => {
            out.extend(bytes.iter().filter(|b| **b != 0).map(|b| *b as char));
            out.push('\n');
        }
        lopdf::Object::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

fn is_xlsx(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK")
}

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

// ============================================================================
// Workbook
// ============================================================================

#[test]
fn workbook_with_native_chart() {
    let report = report(Labels::english());
    assert!(report.chart.is_some());
    let bytes = ExcelRenderer::new().render(&report).expect("workbook renders");
    assert!(is_xlsx(&bytes));
}

#[test]
fn workbook_without_chart_is_still_written() {
    let mut report = report(Labels::english());
    report.chart = None;
    let bytes = ExcelRenderer::new().render(&report).expect("chartless workbook renders");
    assert!(is_xlsx(&bytes));

    let bytes = ExcelRenderer::new()
        .no_chart()
        .render(&self::report(Labels::english()))
        .unwrap();
    assert!(is_xlsx(&bytes));
}

#[test]
fn workbook_sanitizes_sheet_name() {
    let report = report(Labels::vietnamese());
    let bytes = ExcelRenderer::new()
        .sheet_name("Hours [2024]: Apollo/Gemini comparison by month")
        .render(&report)
        .expect("unsafe sheet name is sanitized");
    assert!(is_xlsx(&bytes));
}

#[test]
fn workbook_for_empty_result() {
    let mut report = report(Labels::english());
    report.result = ComparisonResult::empty(
        ComparisonMode::ProjectsInYear,
        "no timesheet entries for projects Apollo, Gemini in 2019",
    );
    report.chart = None;
    let bytes = ExcelRenderer::new().render_to_bytes(&report).unwrap();
    assert!(is_xlsx(&bytes));
}

#[test]
fn workbook_layout_table_then_metadata() {
    let bytes = ExcelRenderer::new().render(&report(Labels::english())).unwrap();
    let range = sheet(bytes, "Comparison Report");

    assert_eq!(range.start(), Some((0, 0)));
    let header: Vec<String> = (0..4).map(|c| text_at(&range, 0, c)).collect();
    assert_eq!(header, vec!["Project Name", "January", "February", "Total Hours"]);
    assert_eq!(text_at(&range, 1, 0), "Apollo");
    assert_eq!(text_at(&range, 2, 0), "Gemini");

    assert_eq!(text_at(&range, 3, 0), "Total");
    let totals: Vec<Option<&Data>> = (1..4).map(|c| range.get_value((3, c))).collect();
    assert_eq!(
        totals,
        vec![Some(&Data::Float(13.0)), Some(&Data::Float(12.0)), Some(&Data::Float(25.0))]
    );

    // Two blank rows separate the table from the metadata block
    for row in 4..6 {
        assert_eq!(text_at(&range, row, 0), "", "row {row} should be blank");
    }
    assert_eq!(text_at(&range, 6, 0), "Comparison Report");
    let labels: Vec<String> = (7..11).map(|r| text_at(&range, r, 0)).collect();
    assert_eq!(labels, vec!["Comparison Mode", "Years", "Months", "Projects"]);
    assert_eq!(text_at(&range, 8, 1), "2024");
    assert_eq!(text_at(&range, 10, 1), "Apollo, Gemini");
}

#[test]
fn workbook_chart_ranges_stop_above_total_row() {
    let bytes = ExcelRenderer::new().render(&report(Labels::english())).unwrap();
    let xml = chart_xml(bytes);

    // Month headers, then one series per project row
    assert!(xml.contains("$B$1:$C$1"), "categories missing:\n{xml}");
    assert!(xml.contains("$B$2:$C$2"), "Apollo series missing:\n{xml}");
    assert!(xml.contains("$B$3:$C$3"), "Gemini series missing:\n{xml}");
    assert!(xml.contains("$A$2") && xml.contains("$A$3"));
    // Sheet row 4 holds the Total row
    assert!(!xml.contains("$A$4"), "Total row named as a series:\n{xml}");
    assert!(!xml.contains("$B$4:$C$4"), "Total row plotted:\n{xml}");
}

// ============================================================================
// Document
// ============================================================================

#[test]
fn document_renders_with_or_without_chart() {
    let scratch = tempdir().unwrap();
    let renderer = DocumentRenderer::new()
        .scratch_in(scratch.path())
        .raster_size(800, 480);

    // Rasterization may degrade on hosts without fonts; the document must not
    let with_chart = renderer.render(&report(Labels::english())).unwrap();
    assert!(is_pdf(&with_chart));

    let mut chartless = report(Labels::english());
    chartless.chart = None;
    let without_chart = renderer.render(&chartless).unwrap();
    assert!(is_pdf(&without_chart));
}

#[test]
fn scratch_directory_is_removed_after_render() {
    let scratch = tempdir().unwrap();
    let renderer = DocumentRenderer::new()
        .scratch_in(scratch.path())
        .raster_size(640, 400);
    renderer.render(&report(Labels::english())).unwrap();

    let leftovers: Vec<_> = fs::read_dir(scratch.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "scratch files left behind: {leftovers:?}");
}

#[test]
fn missing_logo_degrades() {
    let renderer = DocumentRenderer::new()
        .title("Hours review")
        .logo("/nonexistent/logo.png")
        .raster_size(640, 400);
    let mut report = report(Labels::vietnamese());
    report.chart = None;
    let bytes = renderer.render(&report).expect("document renders without logo");
    assert!(is_pdf(&bytes));
}

#[test]
fn document_chart_page_carries_caption_and_image() {
    let scratch = tempdir().unwrap();
    let report = over_time_report();
    assert_eq!(report.chart.as_ref().and_then(|c| c.subject.as_deref()), Some("Apollo"));

    let bytes = DocumentRenderer::new()
        .scratch_in(scratch.path())
        .raster_size(640, 400)
        .render(&report)
        .unwrap();
    let pages = pdf_pages(&bytes);

    assert_eq!(pages.len(), 2, "cover plus chart page");
    assert!(pages[0].text.contains("Comparison Report"));
    assert!(!pages[0].text.contains("No chart available"));
    assert!(pages[1].text.contains("Project: Apollo"), "caption missing: {}", pages[1].text);
    assert!(pages[1].text.contains("Apollo: Hours by Month (2024)"));
    assert!(pages[1].operators.iter().any(|op| op == "Do"), "chart image not drawn");
}

#[test]
fn document_without_chart_has_notice_on_cover() {
    let mut report = report(Labels::english());
    report.chart = None;
    let bytes = DocumentRenderer::new().render(&report).unwrap();
    let pages = pdf_pages(&bytes);

    assert_eq!(pages.len(), 1);
    assert!(
        pages[0].text.contains("No chart available for this report."),
        "notice missing: {}",
        pages[0].text
    );
    assert!(!pages[0].operators.iter().any(|op| op == "Do"));
}

#[test]
fn long_metadata_continues_on_next_page() {
    let projects: Vec<String> = (1..=600).map(|i| format!("Workstream-{i:03}")).collect();
    let table: TimeTable = projects
        .iter()
        .map(|p| TimeEntry::new(2024, Month::January, p.as_str(), 1.0))
        .collect();
    let selection = projects.iter().fold(
        ComparisonSelection::new(ComparisonMode::ProjectsInYear).year(2024),
        |selection, p| selection.project(p.as_str()),
    );
    let mut report = run(&table, &selection, Labels::english());
    report.chart = None;

    let bytes = DocumentRenderer::new().render(&report).unwrap();
    let pages = pdf_pages(&bytes);

    assert!(pages.len() >= 2, "metadata should overflow the cover, got {} page(s)", pages.len());
    let all_text: String = pages.iter().map(|p| p.text.as_str()).collect();
    assert!(all_text.contains("Workstream-001"));
    assert!(all_text.contains("Workstream-600"));
    let last = pages.last().unwrap();
    assert!(last.text.contains("No chart available for this report."));
}

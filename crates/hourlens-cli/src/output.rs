//! Terminal output for the CLI commands
//!
//! Text mode prints aligned tables for people; JSON mode prints one object
//! per run for scripts. Both go to stdout, logs go to stderr.

use std::path::PathBuf;

use clap::ValueEnum;
use hourlens_core::{Cell, ComparisonSelection, EmptyResult, Labels, ResultTable, SelectionError};
use hourlens_engine::DeltaReport;
use hourlens_ingest::Normalized;
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ============================================================================
// Tables
// ============================================================================

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) => format!("{n:.2}"),
        other => other.to_string(),
    }
}

/// Render rows as left-aligned text columns, numbers right-aligned
pub fn text_table(headers: &[String], rows: &[Vec<Cell>]) -> String {
    let formatted: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &formatted {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for (row, cells) in formatted.iter().zip(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(cells)
            .zip(&widths)
            .map(|((value, cell), w)| {
                if cell.as_number().is_some() {
                    format!("{value:>w$}")
                } else {
                    format!("{value:<w$}")
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn result_text(table: &ResultTable) -> String {
    let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
    let rows: Vec<Vec<Cell>> = table.rows.iter().map(|r| r.cells.clone()).collect();
    text_table(&headers, &rows)
}

// ============================================================================
// Commands
// ============================================================================

pub fn print_check(format: OutputFormat, normalized: &Normalized) {
    let table = &normalized.table;
    let years: Vec<i32> = table.years().into_iter().collect();
    let projects: Vec<String> = table.projects().into_iter().collect();
    match format {
        OutputFormat::Json => {
            let value = json!({
                "status": "ok",
                "entries": table.len(),
                "total_hours": table.total_hours(),
                "years": years,
                "projects": projects,
                "dropped_rows": normalized.dropped_rows,
                "unlabelled_rows": normalized.unlabelled_rows,
                "zeroed_hours": normalized.zeroed_hours,
            });
            println!("{value:#}");
        }
        OutputFormat::Text => {
            println!("Entries:      {}", table.len());
            println!("Total hours:  {:.2}", table.total_hours());
            println!(
                "Years:        {}",
                years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
            );
            println!("Projects:     {}", projects.len());
            for project in &projects {
                println!("  - {project}");
            }
            if normalized.has_warnings() {
                println!("Dropped rows: {} (unreadable date)", normalized.dropped_rows);
                println!("Unlabelled:   {} (blank project)", normalized.unlabelled_rows);
                println!("Zeroed hours: {}", normalized.zeroed_hours);
            }
        }
    }
}

pub fn print_rejection(format: OutputFormat, rejection: &SelectionError) {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "status": "rejected",
                "dimension": rejection.dimension(),
                "message": rejection.to_string(),
            });
            println!("{value:#}");
        }
        OutputFormat::Text => println!("Selection rejected: {rejection}"),
    }
}

pub fn print_empty(format: OutputFormat, empty: &EmptyResult, labels: &Labels) {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "status": "empty",
                "mode": empty.mode,
                "reason": empty.reason,
            });
            println!("{value:#}");
        }
        OutputFormat::Text => println!("{}: {}", labels.no_data, empty.reason),
    }
}

pub fn print_report(
    format: OutputFormat,
    selection: &ComparisonSelection,
    table: &ResultTable,
    chart: Option<&hourlens_core::ChartSpec>,
    files: &[PathBuf],
) {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "status": "report",
                "selection": selection,
                "table": table,
                "chart": chart,
                "files": files,
            });
            println!("{value:#}");
        }
        OutputFormat::Text => {
            print!("{}", result_text(table));
            if chart.is_none() {
                println!("(no chart)");
            }
            for file in files {
                println!("Wrote {}", file.display());
            }
        }
    }
}

pub fn print_delta(format: OutputFormat, report: &DeltaReport, labels: &Labels) {
    match format {
        OutputFormat::Json => {
            let status = if report.is_empty() { "empty" } else { "report" };
            let value = json!({
                "status": status,
                "delta": report,
                "total_delta": report.total_delta(),
            });
            println!("{value:#}");
        }
        OutputFormat::Text => {
            let headers: Vec<String> = [
                labels.project_column,
                labels.reporting_hours_column,
                labels.baseline_hours_column,
                labels.delta_hours_column,
                labels.percent_change_column,
            ]
            .iter()
            .map(|h| h.to_string())
            .collect();
            let rows: Vec<Vec<Cell>> = report
                .rows
                .iter()
                .map(|row| {
                    vec![
                        Cell::text(&row.project),
                        Cell::Number(row.reporting_hours),
                        Cell::Number(row.baseline_hours),
                        Cell::Number(row.delta_hours),
                        row.percent_change
                            .map_or_else(|| Cell::text(labels.not_available), Cell::Number),
                    ]
                })
                .collect();
            println!("{} {} vs {} {}", report.reporting, report.year, report.baseline, report.year);
            print!("{}", text_table(&headers, &rows));
        }
    }
}

//! hourlens CLI - Timesheet Comparison Reports
//!
//! Command-line interface for inspecting timesheets and writing comparison
//! reports as Excel workbooks and PDF documents.

mod config;
mod exit;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hourlens_core::naming::ReportFilenames;
use hourlens_core::{
    ComparisonMode, ComparisonReport, ComparisonSelection, Labels, Locale, Month, ReportRenderer,
    SelectionError,
};
use hourlens_engine::{compare_months, ComparisonEngine, ComparisonOutcome, DeltaSelection};
use hourlens_render::{DocumentRenderer, ExcelRenderer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use exit::ExitCode;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "hourlens")]
#[command(author, version, about = "Timesheet comparison reports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a timesheet and summarize what was found
    Check {
        /// Timesheet file (.csv, .xlsx, .xlsm, .xls, .ods)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Worksheet to read (default: "Raw Data", then the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Build a comparison report and write it as xlsx and pdf
    Compare(CompareArgs),

    /// Compare per-project hours of two months of one year
    Delta {
        /// Timesheet file (.csv, .xlsx, .xlsm, .xls, .ods)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        year: i32,

        /// Month under review
        #[arg(long)]
        reporting: String,

        /// Month to compare against
        #[arg(long)]
        baseline: String,

        /// Project to include (repeatable)
        #[arg(long = "project", value_name = "NAME", required = true)]
        projects: Vec<String>,

        #[arg(long, env = "HOURLENS_LOCALE")]
        locale: Option<Locale>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Timesheet file (.csv, .xlsx, .xlsm, .xls, .ods)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "HOURLENS_CONFIG")]
    config: Option<PathBuf>,

    /// projects-in-month, projects-in-year or project-over-time
    #[arg(short, long)]
    mode: Option<String>,

    /// Year to include (repeatable or comma separated)
    #[arg(long = "year", value_name = "YEAR", value_delimiter = ',')]
    years: Vec<i32>,

    /// Month to include (repeatable or comma separated)
    #[arg(long = "month", value_name = "MONTH", value_delimiter = ',')]
    months: Vec<String>,

    /// Project to include (repeatable)
    #[arg(long = "project", value_name = "NAME")]
    projects: Vec<String>,

    #[arg(long, env = "HOURLENS_LOCALE")]
    locale: Option<Locale>,

    /// Document title (default: the locale's report title)
    #[arg(long)]
    title: Option<String>,

    /// Logo image for the document's first page
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Directory for the report files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    sheet: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Skip the Excel workbook
    #[arg(long)]
    no_xlsx: bool,

    /// Skip the PDF document
    #[arg(long)]
    no_pdf: bool,

    /// Report date (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    generated_on: Option<NaiveDate>,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Failure.into()
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            file,
            sheet,
            format,
        } => {
            let normalized = hourlens_ingest::load_table(&file, sheet.as_deref())
                .with_context(|| format!("failed to load {}", file.display()))?;
            output::print_check(format, &normalized);
            Ok(ExitCode::Success)
        }
        Commands::Compare(args) => compare(args),
        Commands::Delta {
            file,
            sheet,
            year,
            reporting,
            baseline,
            projects,
            locale,
            format,
        } => {
            let labels = Labels::new(locale.unwrap_or_default());
            let selection = match delta_selection(year, &reporting, &baseline, projects) {
                Ok(selection) => selection,
                Err(rejection) => {
                    output::print_rejection(format, &rejection);
                    return Ok(ExitCode::Rejected);
                }
            };
            let normalized = hourlens_ingest::load_table(&file, sheet.as_deref())
                .with_context(|| format!("failed to load {}", file.display()))?;

            match compare_months(&normalized.table, &selection) {
                Err(rejection) => {
                    output::print_rejection(format, &rejection);
                    Ok(ExitCode::Rejected)
                }
                Ok(report) => {
                    output::print_delta(format, &report, &labels);
                    Ok(if report.is_empty() {
                        ExitCode::Empty
                    } else {
                        ExitCode::Success
                    })
                }
            }
        }
    }
}

fn delta_selection(
    year: i32,
    reporting: &str,
    baseline: &str,
    projects: Vec<String>,
) -> Result<DeltaSelection, SelectionError> {
    Ok(DeltaSelection {
        year,
        reporting: reporting.parse()?,
        baseline: baseline.parse()?,
        projects: projects.into_iter().collect(),
    })
}

// ============================================================================
// compare
// ============================================================================

fn compare(args: CompareArgs) -> Result<ExitCode> {
    let config = Config::load_optional(args.config.as_deref())?;

    let locale = match (args.locale, config.report.locale.as_deref()) {
        (Some(locale), _) => locale,
        (None, Some(text)) => text.parse::<Locale>().map_err(anyhow::Error::msg)?,
        (None, None) => Locale::default(),
    };
    let labels = Labels::new(locale);

    let Some(mode) = args.mode.as_deref().or(config.selection.mode.as_deref()) else {
        bail!("no comparison mode given (use --mode or [selection] mode in the config)");
    };
    let years = prefer(args.years, config.selection.years);
    let months = prefer(args.months, config.selection.months);
    let projects = prefer(args.projects, config.selection.projects);

    let selection = match build_selection(mode, &years, &months, projects) {
        Ok(selection) => selection,
        Err(rejection) => {
            output::print_rejection(args.format, &rejection);
            return Ok(ExitCode::Rejected);
        }
    };

    let normalized = hourlens_ingest::load_table(&args.file, args.sheet.as_deref())
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let mut engine = ComparisonEngine::new(labels);
    if let Some(date) = args.generated_on {
        engine = engine.generated_on(date);
    }

    let report = match engine.run(&normalized.table, &selection) {
        ComparisonOutcome::Rejected(rejection) => {
            output::print_rejection(args.format, &rejection);
            return Ok(ExitCode::Rejected);
        }
        ComparisonOutcome::Empty(empty) => {
            output::print_empty(args.format, &empty, engine.labels());
            return Ok(ExitCode::Empty);
        }
        ComparisonOutcome::Report(report) => report,
    };

    let output_dir = args
        .output_dir
        .or(config.report.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let document = DocumentRenderer {
        branding: hourlens_render::Branding {
            title: args.title.or(config.report.title),
            logo: args.logo.or(config.report.logo),
        },
        ..DocumentRenderer::default()
    };

    let mut files = Vec::new();
    if !(args.no_xlsx && args.no_pdf) {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;
    }
    let names = ReportFilenames::for_selection(&report.selection);
    if !args.no_xlsx {
        let path = output_dir.join(&names.workbook);
        write_report(&ExcelRenderer::new(), &report, &path)?;
        files.push(path);
    }
    if !args.no_pdf {
        let path = output_dir.join(&names.document);
        write_report(&document, &report, &path)?;
        files.push(path);
    }

    output::print_report(
        args.format,
        &report.selection,
        &report.table(),
        report.chart.as_ref(),
        &files,
    );
    Ok(ExitCode::Success)
}

/// Flag values replace config values as a whole
fn prefer<T>(flags: Vec<T>, config: Vec<T>) -> Vec<T> {
    if flags.is_empty() {
        config
    } else {
        flags
    }
}

fn build_selection(
    mode: &str,
    years: &[i32],
    months: &[String],
    projects: Vec<String>,
) -> Result<ComparisonSelection, SelectionError> {
    let mode: ComparisonMode = mode.parse()?;
    let months = months
        .iter()
        .map(|m| m.parse::<Month>())
        .collect::<Result<_, _>>()?;
    Ok(ComparisonSelection {
        mode,
        years: years.iter().copied().collect(),
        months,
        projects: projects
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    })
}

fn write_report<R>(renderer: &R, report: &ComparisonReport, path: &Path) -> Result<()>
where
    R: ReportRenderer<Output = Vec<u8>>,
{
    let bytes = renderer
        .render(report)
        .with_context(|| format!("failed to render {}", path.display()))?;
    fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_selection_from_text() {
        let selection = build_selection(
            "projects in month",
            &[2024],
            &["MARCH".to_string()],
            vec![" Apollo ".into(), String::new(), "Gemini".into()],
        )
        .unwrap();
        assert_eq!(selection.mode, ComparisonMode::ProjectsInMonth);
        assert_eq!(selection.months.into_iter().collect::<Vec<_>>(), vec![Month::March]);
        assert_eq!(
            selection.projects.into_iter().collect::<Vec<_>>(),
            vec!["Apollo".to_string(), "Gemini".to_string()]
        );
    }

    #[test]
    fn unknown_mode_and_month_are_rejections() {
        assert!(matches!(
            build_selection("pivot", &[], &[], vec![]),
            Err(SelectionError::UnknownMode(_))
        ));
        assert!(matches!(
            build_selection("projects-in-month", &[2024], &["Smarch".into()], vec![]),
            Err(SelectionError::UnknownMonth(_))
        ));
    }

    #[test]
    fn flags_replace_config_lists() {
        assert_eq!(prefer(vec![2023], vec![2024, 2025]), vec![2023]);
        assert_eq!(prefer(Vec::new(), vec![2024]), vec![2024]);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! # hourlens-engine
//!
//! Turns a normalized timesheet and a user selection into a comparison
//! report.
//!
//! This crate provides:
//! - Mode-specific selection validation with structured rejections
//! - Aggregation into per-project totals, monthly pivots and time series
//! - Chart planning against the result table layout
//! - Month-over-month delta reports
//!
//! ## Example
//!
//! ```rust
//! use hourlens_core::{ComparisonMode, ComparisonSelection, Labels, Month, TimeEntry, TimeTable};
//! use hourlens_engine::{ComparisonEngine, ComparisonOutcome};
//!
//! let table = TimeTable::new(vec![
//!     TimeEntry::new(2024, Month::March, "Apollo", 12.0),
//!     TimeEntry::new(2024, Month::March, "Gemini", 7.5),
//! ]);
//! let selection = ComparisonSelection::new(ComparisonMode::ProjectsInMonth)
//!     .year(2024)
//!     .month(Month::March)
//!     .project("Apollo")
//!     .project("Gemini");
//!
//! let engine = ComparisonEngine::new(Labels::english());
//! match engine.run(&table, &selection) {
//!     ComparisonOutcome::Report(report) => assert!(report.chart.is_some()),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod aggregate;
pub mod chart;
pub mod delta;
pub mod validate;

use chrono::{Local, NaiveDate};
use hourlens_core::{
    ComparisonReport, ComparisonResult, ComparisonSelection, EmptyResult, Labels, SelectionError,
    TimeTable,
};

pub use aggregate::aggregate;
pub use chart::{build_chart, plan_chart, ChartPlan, NoChartReason};
pub use delta::{compare_months, DeltaReport, DeltaRow, DeltaSelection};
pub use validate::validate;

/// Result of one pipeline run. Rejections and empty results are ordinary
/// outcomes, not errors.
#[derive(Clone, Debug)]
pub enum ComparisonOutcome {
    /// The selection broke a rule of its mode
    Rejected(SelectionError),
    /// The selection was legal but matched no timesheet entries
    Empty(EmptyResult),
    Report(ComparisonReport),
}

impl ComparisonOutcome {
    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            ComparisonOutcome::Report(report) => Some(report),
            _ => None,
        }
    }
}

/// Validate, aggregate and plan the chart for a selection
#[derive(Clone, Debug, Default)]
pub struct ComparisonEngine {
    labels: Labels,
    generated_on: Option<NaiveDate>,
}

impl ComparisonEngine {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            generated_on: None,
        }
    }

    /// Fix the report date instead of using today's
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn run(&self, table: &TimeTable, selection: &ComparisonSelection) -> ComparisonOutcome {
        let valid = match validate(selection) {
            Ok(valid) => valid,
            Err(rejection) => {
                tracing::info!(
                    mode = %selection.mode,
                    dimension = ?rejection.dimension(),
                    %rejection,
                    "selection rejected"
                );
                return ComparisonOutcome::Rejected(rejection);
            }
        };

        let result = aggregate(table, &valid);
        if let ComparisonResult::Empty(empty) = result {
            tracing::info!(mode = %empty.mode, reason = %empty.reason, "empty result");
            return ComparisonOutcome::Empty(empty);
        }

        let chart = build_chart(&result, &valid, &self.labels);
        ComparisonOutcome::Report(ComparisonReport {
            selection: selection.clone(),
            result,
            chart,
            labels: self.labels.clone(),
            generated_on: self
                .generated_on
                .unwrap_or_else(|| Local::now().date_naive()),
        })
    }
}

//! Chart planning
//!
//! Maps a result shape to an abstract [`ChartSpec`]. The chart kind per
//! shape is fixed:
//!
//! | Result                  | Kind | Categories          | Series                 |
//! |-------------------------|------|---------------------|------------------------|
//! | projects in a month     | Bar  | project column      | total hours            |
//! | projects in a year      | Line | month header cells  | one per project row    |
//! | one project, by month   | Bar  | month column        | total hours            |
//! | one project, by year    | Line | year column         | total hours            |
//!
//! References point into the full [`ResultTable`] layout, so the Total row of
//! a pivot stays in the written table while no series or category touches it.

use std::fmt;

use hourlens_core::{
    CategorySource, ChartKind, ChartSpec, ColumnKey, ComparisonMode, ComparisonResult, Labels,
    ResultTable, SeriesSource, SeriesSpec, TimeSpan, ValidSelection,
};

/// Why no chart accompanies a report
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoChartReason {
    /// The aggregate had no rows at all
    EmptyResult,
    /// Nothing remained once summary rows were dropped
    OnlyTotalRows,
    /// A pivot without any month column
    NoMonthColumns,
    /// Result shape does not belong to the selection's mode
    ShapeMismatch {
        shape: &'static str,
        mode: ComparisonMode,
    },
}

impl fmt::Display for NoChartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoChartReason::EmptyResult => write!(f, "result is empty"),
            NoChartReason::OnlyTotalRows => write!(f, "result holds only summary rows"),
            NoChartReason::NoMonthColumns => write!(f, "pivot has no month columns"),
            NoChartReason::ShapeMismatch { shape, mode } => {
                write!(f, "{shape} result does not match {mode} selection")
            }
        }
    }
}

/// Outcome of chart planning
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartPlan {
    Chart(ChartSpec),
    NoChart(NoChartReason),
}

impl ChartPlan {
    pub fn into_spec(self) -> Option<ChartSpec> {
        match self {
            ChartPlan::Chart(spec) => Some(spec),
            ChartPlan::NoChart(_) => None,
        }
    }
}

/// Build the chart for `result`, or `None` when there is nothing to plot
pub fn build_chart(
    result: &ComparisonResult,
    selection: &ValidSelection,
    labels: &Labels,
) -> Option<ChartSpec> {
    plan_chart(result, selection, labels).into_spec()
}

/// Build the chart for `result`, keeping the reason when there is none
pub fn plan_chart(result: &ComparisonResult, selection: &ValidSelection, labels: &Labels) -> ChartPlan {
    let plan = plan(result, selection, labels);
    if let ChartPlan::NoChart(reason) = &plan {
        tracing::debug!(%reason, mode = %selection.mode(), "no chart for report");
    }
    plan
}

fn plan(result: &ComparisonResult, selection: &ValidSelection, labels: &Labels) -> ChartPlan {
    if result.is_empty() {
        return ChartPlan::NoChart(NoChartReason::EmptyResult);
    }
    if result.without_total().is_empty() {
        return ChartPlan::NoChart(NoChartReason::OnlyTotalRows);
    }

    let table = result.table(labels);
    let Some(rows) = table.data_row_span() else {
        return ChartPlan::NoChart(NoChartReason::OnlyTotalRows);
    };
    let mismatch = || {
        ChartPlan::NoChart(NoChartReason::ShapeMismatch {
            shape: result.shape_name(),
            mode: selection.mode(),
        })
    };
    let Some(hours) = table.column_index(ColumnKey::TotalHours) else {
        return mismatch();
    };

    match (result, selection) {
        (ComparisonResult::ProjectsInMonth(totals), ValidSelection::ProjectsInMonth { .. }) => {
            let Some(project) = table.column_index(ColumnKey::Project) else {
                return mismatch();
            };
            ChartPlan::Chart(ChartSpec {
                kind: ChartKind::Bar,
                title: labels.title_projects_in_month(totals.month, totals.year),
                x_axis: labels.axis_project.to_string(),
                y_axis: labels.axis_hours.to_string(),
                categories: CategorySource::ColumnCells {
                    column: project,
                    rows: rows.clone(),
                },
                series: vec![SeriesSpec {
                    label: labels.total_hours_column.to_string(),
                    source: SeriesSource::ColumnCells {
                        column: hours,
                        rows,
                    },
                }],
                subject: None,
            })
        }
        (ComparisonResult::ProjectsInYear(pivot), ValidSelection::ProjectsInYear { .. }) => {
            let months = table.month_hour_columns();
            if months.is_empty() {
                return ChartPlan::NoChart(NoChartReason::NoMonthColumns);
            }
            ChartPlan::Chart(ChartSpec {
                kind: ChartKind::Line,
                title: labels.title_projects_in_year(pivot.year),
                x_axis: labels.axis_month.to_string(),
                y_axis: labels.axis_hours.to_string(),
                categories: CategorySource::HeaderCells {
                    columns: months.clone(),
                },
                series: pivot_series(&table, rows, &months),
                subject: None,
            })
        }
        (
            ComparisonResult::OverTime(series),
            ValidSelection::ProjectOverTime {
                span: TimeSpan::Months { year, .. },
                ..
            },
        ) if series.by_month() => ChartPlan::Chart(ChartSpec {
            kind: ChartKind::Bar,
            title: labels.title_over_months(&series.project, *year),
            x_axis: labels.axis_month.to_string(),
            y_axis: labels.axis_hours.to_string(),
            categories: CategorySource::ColumnCells {
                column: 0,
                rows: rows.clone(),
            },
            series: vec![SeriesSpec {
                label: labels.total_hours_for(&series.project),
                source: SeriesSource::ColumnCells {
                    column: hours,
                    rows,
                },
            }],
            subject: Some(series.project.clone()),
        }),
        (
            ComparisonResult::OverTime(series),
            ValidSelection::ProjectOverTime {
                span: TimeSpan::Years(_),
                ..
            },
        ) if series.by_year() => ChartPlan::Chart(ChartSpec {
            kind: ChartKind::Line,
            title: labels.title_over_years(&series.project),
            x_axis: labels.axis_year.to_string(),
            y_axis: labels.axis_hours.to_string(),
            categories: CategorySource::ColumnCells {
                column: 0,
                rows: rows.clone(),
            },
            series: vec![SeriesSpec {
                label: labels.total_hours_for(&series.project),
                source: SeriesSource::ColumnCells {
                    column: hours,
                    rows,
                },
            }],
            subject: Some(series.project.clone()),
        }),
        _ => mismatch(),
    }
}

/// One line per project row, labelled by the row's project cell
fn pivot_series(table: &ResultTable, rows: std::ops::Range<usize>, months: &[usize]) -> Vec<SeriesSpec> {
    rows.filter(|r| table.rows.get(*r).is_some_and(|row| !row.is_total()))
        .map(|row| SeriesSpec {
            label: table
                .cell(row, 0)
                .map(ToString::to_string)
                .unwrap_or_default(),
            source: SeriesSource::RowCells {
                row,
                columns: months.to_vec(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourlens_core::{Month, MonthlyPivot, PivotRow, RowKey};
    use pretty_assertions::assert_eq;

    fn year_selection() -> ValidSelection {
        ValidSelection::ProjectsInYear {
            year: 2024,
            projects: ["A", "B"].iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn only_total_row_yields_no_chart() {
        let result = ComparisonResult::ProjectsInYear(MonthlyPivot {
            year: 2024,
            months: vec![Month::January],
            rows: vec![PivotRow {
                key: RowKey::Total,
                cells: vec![1.0],
                total_hours: 1.0,
            }],
        });
        assert_eq!(
            plan_chart(&result, &year_selection(), &Labels::english()),
            ChartPlan::NoChart(NoChartReason::OnlyTotalRows)
        );
    }

    #[test]
    fn shape_mismatch_is_reported_not_raised() {
        let result = ComparisonResult::ProjectsInYear(MonthlyPivot {
            year: 2024,
            months: vec![Month::January],
            rows: vec![PivotRow {
                key: RowKey::Project("A".into()),
                cells: vec![1.0],
                total_hours: 1.0,
            }],
        });
        let selection = ValidSelection::ProjectOverTime {
            project: "A".into(),
            span: TimeSpan::Years([2023, 2024].into_iter().collect()),
        };
        assert!(matches!(
            plan_chart(&result, &selection, &Labels::english()),
            ChartPlan::NoChart(NoChartReason::ShapeMismatch { .. })
        ));
        assert_eq!(build_chart(&result, &selection, &Labels::english()), None);
    }

    #[test]
    fn pivot_without_months_has_no_chart() {
        let result = ComparisonResult::ProjectsInYear(MonthlyPivot {
            year: 2024,
            months: vec![],
            rows: vec![PivotRow {
                key: RowKey::Project("A".into()),
                cells: vec![],
                total_hours: 0.0,
            }],
        });
        assert_eq!(
            plan_chart(&result, &year_selection(), &Labels::english()),
            ChartPlan::NoChart(NoChartReason::NoMonthColumns)
        );
    }

    #[test]
    fn reasons_display() {
        let reason = NoChartReason::ShapeMismatch {
            shape: "monthly pivot",
            mode: ComparisonMode::ProjectOverTime,
        };
        assert_eq!(
            reason.to_string(),
            "monthly pivot result does not match project-over-time selection"
        );
    }
}

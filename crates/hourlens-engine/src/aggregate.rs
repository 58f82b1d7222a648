//! Aggregation of a normalized timesheet into mode-shaped results
//!
//! Every grouping runs through a `BTreeMap`, so project rows come out sorted
//! by name, months in calendar order and years ascending, independent of the
//! order entries were read in.

use std::collections::{BTreeMap, BTreeSet};

use hourlens_core::{
    ComparisonMode, ComparisonResult, Month, MonthlyPivot, PivotRow, ProjectTotal, ProjectTotals,
    RowKey, TimeBucket, TimeSeries, TimeSeriesRow, TimeSpan, TimeTable, ValidSelection,
};

/// Reshape `table` according to a validated selection
pub fn aggregate(table: &TimeTable, selection: &ValidSelection) -> ComparisonResult {
    let result = match selection {
        ValidSelection::ProjectsInMonth {
            year,
            month,
            projects,
        } => projects_in_month(table, *year, *month, projects),
        ValidSelection::ProjectsInYear { year, projects } => projects_in_year(table, *year, projects),
        ValidSelection::ProjectOverTime {
            project,
            span: TimeSpan::Months { year, months },
        } => project_over_months(table, project, *year, months),
        ValidSelection::ProjectOverTime {
            project,
            span: TimeSpan::Years(years),
        } => project_over_years(table, project, years),
    };

    tracing::debug!(
        mode = %selection.mode(),
        shape = result.shape_name(),
        rows = result.row_count(),
        "aggregated selection"
    );
    result
}

/// Hours per selected project within one month
pub(crate) fn month_totals(
    table: &TimeTable,
    year: i32,
    month: Month,
    projects: &BTreeSet<String>,
) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for entry in table
        .entries()
        .iter()
        .filter(|e| e.year == year && e.month == month && projects.contains(&e.project))
    {
        *totals.entry(entry.project.clone()).or_insert(0.0) += entry.hours;
    }
    totals
}

fn projects_in_month(
    table: &TimeTable,
    year: i32,
    month: Month,
    projects: &BTreeSet<String>,
) -> ComparisonResult {
    let totals = month_totals(table, year, month, projects);
    if totals.is_empty() {
        return ComparisonResult::empty(
            ComparisonMode::ProjectsInMonth,
            format!(
                "no timesheet entries for projects {} in {month} {year}",
                list(projects)
            ),
        );
    }

    ComparisonResult::ProjectsInMonth(ProjectTotals {
        year,
        month,
        rows: totals
            .into_iter()
            .map(|(project, total_hours)| ProjectTotal {
                project,
                total_hours,
            })
            .collect(),
    })
}

fn projects_in_year(table: &TimeTable, year: i32, projects: &BTreeSet<String>) -> ComparisonResult {
    let mut grid: BTreeMap<&str, BTreeMap<Month, f64>> = BTreeMap::new();
    let mut months: BTreeSet<Month> = BTreeSet::new();
    for entry in table
        .entries()
        .iter()
        .filter(|e| e.year == year && projects.contains(&e.project))
    {
        months.insert(entry.month);
        *grid
            .entry(entry.project.as_str())
            .or_default()
            .entry(entry.month)
            .or_insert(0.0) += entry.hours;
    }

    if grid.is_empty() {
        return ComparisonResult::empty(
            ComparisonMode::ProjectsInYear,
            format!("no timesheet entries for projects {} in {year}", list(projects)),
        );
    }

    let months: Vec<Month> = months.into_iter().collect();
    let mut column_sums = vec![0.0; months.len()];
    let mut grand_total = 0.0;

    let mut rows: Vec<PivotRow> = grid
        .into_iter()
        .map(|(project, by_month)| {
            let cells: Vec<f64> = months
                .iter()
                .map(|m| by_month.get(m).copied().unwrap_or(0.0))
                .collect();
            let total_hours: f64 = cells.iter().sum();
            for (sum, cell) in column_sums.iter_mut().zip(&cells) {
                *sum += cell;
            }
            grand_total += total_hours;
            PivotRow {
                key: RowKey::Project(project.to_string()),
                cells,
                total_hours,
            }
        })
        .collect();

    rows.push(PivotRow {
        key: RowKey::Total,
        cells: column_sums,
        total_hours: grand_total,
    });

    ComparisonResult::ProjectsInYear(MonthlyPivot { year, months, rows })
}

fn project_over_months(
    table: &TimeTable,
    project: &str,
    year: i32,
    months: &BTreeSet<Month>,
) -> ComparisonResult {
    let mut by_month: BTreeMap<Month, f64> = BTreeMap::new();
    for entry in table
        .entries()
        .iter()
        .filter(|e| e.project == project && e.year == year && months.contains(&e.month))
    {
        *by_month.entry(entry.month).or_insert(0.0) += entry.hours;
    }

    if by_month.is_empty() {
        return ComparisonResult::empty(
            ComparisonMode::ProjectOverTime,
            format!(
                "no timesheet entries for project {project} in {} of {year}",
                list(months)
            ),
        );
    }

    ComparisonResult::OverTime(TimeSeries {
        project: project.to_string(),
        rows: by_month
            .into_iter()
            .map(|(month, total_hours)| TimeSeriesRow {
                bucket: TimeBucket::Month(month),
                total_hours,
            })
            .collect(),
    })
}

fn project_over_years(table: &TimeTable, project: &str, years: &BTreeSet<i32>) -> ComparisonResult {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for entry in table
        .entries()
        .iter()
        .filter(|e| e.project == project && years.contains(&e.year))
    {
        *by_year.entry(entry.year).or_insert(0.0) += entry.hours;
    }

    if by_year.is_empty() {
        return ComparisonResult::empty(
            ComparisonMode::ProjectOverTime,
            format!(
                "no timesheet entries for project {project} in years {}",
                list(years)
            ),
        );
    }

    ComparisonResult::OverTime(TimeSeries {
        project: project.to_string(),
        rows: by_year
            .into_iter()
            .map(|(year, total_hours)| TimeSeriesRow {
                bucket: TimeBucket::Year(year),
                total_hours,
            })
            .collect(),
    })
}

fn list<T: std::fmt::Display>(items: &BTreeSet<T>) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourlens_core::TimeEntry;
    use pretty_assertions::assert_eq;

    fn projects(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn month_totals_sum_per_project() {
        let table = TimeTable::new(vec![
            TimeEntry::new(2024, Month::May, "B", 2.0),
            TimeEntry::new(2024, Month::May, "A", 1.5),
            TimeEntry::new(2024, Month::May, "B", 3.0),
            TimeEntry::new(2024, Month::June, "A", 100.0),
            TimeEntry::new(2023, Month::May, "A", 100.0),
        ]);
        let result = aggregate(
            &table,
            &ValidSelection::ProjectsInMonth {
                year: 2024,
                month: Month::May,
                projects: projects(&["A", "B"]),
            },
        );
        let ComparisonResult::ProjectsInMonth(totals) = result else {
            panic!("expected project totals");
        };
        let rows: Vec<(&str, f64)> = totals
            .rows
            .iter()
            .map(|r| (r.project.as_str(), r.total_hours))
            .collect();
        assert_eq!(rows, vec![("A", 1.5), ("B", 5.0)]);
    }

    #[test]
    fn pivot_fills_missing_cells_with_zero() {
        let table = TimeTable::new(vec![
            TimeEntry::new(2024, Month::April, "A", 4.0),
            TimeEntry::new(2024, Month::February, "B", 2.0),
        ]);
        let result = aggregate(
            &table,
            &ValidSelection::ProjectsInYear {
                year: 2024,
                projects: projects(&["A", "B"]),
            },
        );
        let ComparisonResult::ProjectsInYear(pivot) = result else {
            panic!("expected pivot");
        };
        assert_eq!(pivot.months, vec![Month::February, Month::April]);
        assert_eq!(pivot.cell("A", Month::February), Some(0.0));
        assert_eq!(pivot.cell("B", Month::April), Some(0.0));
        let total = pivot.total_row().unwrap();
        assert_eq!(total.cells, vec![2.0, 4.0]);
        assert_eq!(total.total_hours, 6.0);
        assert_eq!(pivot.rows.last().map(PivotRow::is_total), Some(true));
    }

    #[test]
    fn empty_reason_names_the_filters() {
        let table = TimeTable::new(vec![TimeEntry::new(2024, Month::May, "A", 1.0)]);
        let result = aggregate(
            &table,
            &ValidSelection::ProjectOverTime {
                project: "Zeta".into(),
                span: TimeSpan::Years([2020, 2021].into_iter().collect()),
            },
        );
        let reason = result.empty_reason().unwrap();
        assert!(reason.contains("Zeta"));
        assert!(reason.contains("2020, 2021"));
        assert_eq!(result.mode(), ComparisonMode::ProjectOverTime);
    }
}

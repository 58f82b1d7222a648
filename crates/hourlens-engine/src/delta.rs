//! Month-over-month delta report
//!
//! Compares per-project hours of a reporting month against a baseline month
//! of the same year. Percent change is undefined (`None`) when the baseline
//! is zero.

use std::collections::{BTreeMap, BTreeSet};

use hourlens_core::{Month, SelectionError, TimeTable};
use serde::{Deserialize, Serialize};

use crate::aggregate::month_totals;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSelection {
    pub year: i32,
    pub reporting: Month,
    pub baseline: Month,
    pub projects: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaRow {
    pub project: String,
    pub reporting_hours: f64,
    pub baseline_hours: f64,
    pub delta_hours: f64,
    pub percent_change: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub year: i32,
    pub reporting: Month,
    pub baseline: Month,
    /// Sorted by project name
    pub rows: Vec<DeltaRow>,
}

impl DeltaReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_delta(&self) -> f64 {
        self.rows.iter().map(|r| r.delta_hours).sum()
    }
}

/// Diff two months of the same year for the selected projects
///
/// A project that logged hours in only one of the two months still gets a
/// row, with zero on the other side.
pub fn compare_months(table: &TimeTable, selection: &DeltaSelection) -> Result<DeltaReport, SelectionError> {
    if selection.projects.is_empty() {
        return Err(SelectionError::NoProjects);
    }
    if selection.reporting == selection.baseline {
        return Err(SelectionError::SameMonth(selection.reporting));
    }

    let reporting = month_totals(table, selection.year, selection.reporting, &selection.projects);
    let baseline = month_totals(table, selection.year, selection.baseline, &selection.projects);

    let mut merged: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for (project, hours) in &reporting {
        merged.entry(project.as_str()).or_default().0 = *hours;
    }
    for (project, hours) in &baseline {
        merged.entry(project.as_str()).or_default().1 = *hours;
    }

    let rows = merged
        .into_iter()
        .map(|(project, (reporting_hours, baseline_hours))| {
            let delta_hours = reporting_hours - baseline_hours;
            DeltaRow {
                project: project.to_string(),
                reporting_hours,
                baseline_hours,
                delta_hours,
                percent_change: (baseline_hours != 0.0).then(|| delta_hours / baseline_hours * 100.0),
            }
        })
        .collect();

    Ok(DeltaReport {
        year: selection.year,
        reporting: selection.reporting,
        baseline: selection.baseline,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourlens_core::TimeEntry;
    use pretty_assertions::assert_eq;

    fn selection(projects: &[&str]) -> DeltaSelection {
        DeltaSelection {
            year: 2024,
            reporting: Month::February,
            baseline: Month::January,
            projects: projects.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn percent_change_against_baseline() {
        let table = TimeTable::new(vec![
            TimeEntry::new(2024, Month::January, "A", 8.0),
            TimeEntry::new(2024, Month::February, "A", 10.0),
            TimeEntry::new(2024, Month::February, "B", 4.0),
        ]);
        let report = compare_months(&table, &selection(&["A", "B"])).unwrap();
        assert_eq!(
            report.rows,
            vec![
                DeltaRow {
                    project: "A".into(),
                    reporting_hours: 10.0,
                    baseline_hours: 8.0,
                    delta_hours: 2.0,
                    percent_change: Some(25.0),
                },
                DeltaRow {
                    project: "B".into(),
                    reporting_hours: 4.0,
                    baseline_hours: 0.0,
                    delta_hours: 4.0,
                    percent_change: None,
                },
            ]
        );
        assert_eq!(report.total_delta(), 6.0);
    }

    #[test]
    fn rejects_same_month_and_no_projects() {
        let table = TimeTable::default();
        let mut same = selection(&["A"]);
        same.baseline = Month::February;
        assert_eq!(
            compare_months(&table, &same),
            Err(SelectionError::SameMonth(Month::February))
        );
        assert_eq!(
            compare_months(&table, &selection(&[])),
            Err(SelectionError::NoProjects)
        );
    }
}

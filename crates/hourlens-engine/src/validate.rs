//! Selection validation
//!
//! Mode-specific legality rules. The project check runs first and is the
//! same for every mode; the remaining checks go years, months, projects.

use std::collections::BTreeSet;

use hourlens_core::{
    ComparisonMode, ComparisonSelection, Month, SelectionError, TimeSpan, ValidSelection,
};

/// Check a selection against the rules of its mode
pub fn validate(selection: &ComparisonSelection) -> Result<ValidSelection, SelectionError> {
    if selection.projects.is_empty() {
        return Err(SelectionError::NoProjects);
    }

    let mode = selection.mode;
    match mode {
        ComparisonMode::ProjectsInMonth => {
            let year = single_year(selection)?;
            let month = single_month(selection)?;
            require_comparison(selection)?;
            Ok(ValidSelection::ProjectsInMonth {
                year,
                month,
                projects: selection.projects.clone(),
            })
        }
        ComparisonMode::ProjectsInYear => {
            let year = single_year(selection)?;
            if !selection.months.is_empty() {
                return Err(SelectionError::MonthsNotAllowed {
                    mode,
                    found: selection.months.len(),
                });
            }
            require_comparison(selection)?;
            Ok(ValidSelection::ProjectsInYear {
                year,
                projects: selection.projects.clone(),
            })
        }
        ComparisonMode::ProjectOverTime => {
            let project = match only(&selection.projects) {
                Some(p) => p.clone(),
                None => {
                    return Err(SelectionError::ExactlyOneProject {
                        found: selection.projects.len(),
                    })
                }
            };
            let span = time_span(&selection.years, &selection.months)?;
            Ok(ValidSelection::ProjectOverTime { project, span })
        }
    }
}

fn only<T: Ord>(set: &BTreeSet<T>) -> Option<&T> {
    if set.len() == 1 {
        set.first()
    } else {
        None
    }
}

fn single_year(selection: &ComparisonSelection) -> Result<i32, SelectionError> {
    only(&selection.years)
        .copied()
        .ok_or(SelectionError::ExactlyOneYear {
            mode: selection.mode,
            found: selection.years.len(),
        })
}

fn single_month(selection: &ComparisonSelection) -> Result<Month, SelectionError> {
    only(&selection.months)
        .copied()
        .ok_or(SelectionError::ExactlyOneMonth {
            mode: selection.mode,
            found: selection.months.len(),
        })
}

fn require_comparison(selection: &ComparisonSelection) -> Result<(), SelectionError> {
    if selection.projects.len() < 2 {
        return Err(SelectionError::AtLeastTwoProjects {
            mode: selection.mode,
            found: selection.projects.len(),
        });
    }
    Ok(())
}

/// One year with two or more months, or two or more years with no months
fn time_span(years: &BTreeSet<i32>, months: &BTreeSet<Month>) -> Result<TimeSpan, SelectionError> {
    match (only(years), years.len(), months.len()) {
        (Some(&year), _, m) if m >= 2 => Ok(TimeSpan::Months {
            year,
            months: months.clone(),
        }),
        (_, y, 0) if y >= 2 => Ok(TimeSpan::Years(years.clone())),
        (_, y, m) => Err(SelectionError::InvalidTimeSpan { years: y, months: m }),
    }
}

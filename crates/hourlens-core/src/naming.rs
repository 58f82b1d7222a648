//! Suggested filenames and sheet names
//!
//! Names are derived only from the selection (mode, time bucket, years), so
//! the same selection always suggests the same files.

use crate::{ComparisonMode, ComparisonSelection};

/// Longest name a worksheet may carry
pub const MAX_NAME_LEN: usize = 31;

const INVALID: &[char] = &['\\', '/', '*', '?', '[', ']', ':', ';', '|', '=', ',', '<', '>'];

/// Replace filesystem/sheet-unsafe characters with `_`, drop control
/// characters, cap at [`MAX_NAME_LEN`] characters
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .take(MAX_NAME_LEN)
        .collect()
}

/// Deterministic stem: `<Mode>_<bucket>_<year or first-last>`
pub fn report_stem(selection: &ComparisonSelection) -> String {
    let mode = match selection.mode {
        ComparisonMode::ProjectsInMonth => "ProjectsInMonth",
        ComparisonMode::ProjectsInYear => "ProjectsInYear",
        ComparisonMode::ProjectOverTime => "ProjectOverTime",
    };

    let bucket = match selection.mode {
        ComparisonMode::ProjectsInMonth => selection
            .months
            .iter()
            .next()
            .map(|m| m.name()[..3].to_string())
            .unwrap_or_else(|| "NoMonth".into()),
        ComparisonMode::ProjectsInYear => "All".into(),
        ComparisonMode::ProjectOverTime if selection.months.is_empty() => "Years".into(),
        ComparisonMode::ProjectOverTime => "Months".into(),
    };

    let years = match (selection.years.first(), selection.years.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => "NoYear".into(),
    };

    sanitize_filename(&format!("{mode}_{bucket}_{years}"))
}

/// Suggested names for the two export buffers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFilenames {
    pub workbook: String,
    pub document: String,
}

impl ReportFilenames {
    pub fn for_selection(selection: &ComparisonSelection) -> Self {
        let stem = report_stem(selection);
        Self {
            workbook: format!("{stem}.xlsx"),
            document: format!("{stem}.pdf"),
        }
    }
}

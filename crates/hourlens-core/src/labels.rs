//! Localized display strings
//!
//! Every user-facing string the reports emit comes from a [`Labels`] value
//! chosen once at the pipeline boundary. Nothing downstream compares these
//! strings; the synthetic Total row in particular is identified by its
//! [`RowKind`](crate::RowKind) marker, so "Total" and "Tổng" behave the same.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ComparisonMode, Month};

/// Output language for report labels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "vi" | "vietnamese" => Ok(Locale::Vi),
            other => Err(format!("unknown locale '{other}' (expected en or vi)")),
        }
    }
}

/// Display strings for one locale
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    pub locale: Locale,
    /// Document title on the first page
    pub report_title: &'static str,
    /// Worksheet name (sanitized before use)
    pub sheet_name: &'static str,
    /// Display label of the synthetic summary row
    pub total: &'static str,
    pub project_column: &'static str,
    pub total_hours_column: &'static str,
    pub month_column: &'static str,
    pub year_column: &'static str,
    pub message_column: &'static str,
    pub axis_project: &'static str,
    pub axis_month: &'static str,
    pub axis_year: &'static str,
    pub axis_hours: &'static str,
    pub metadata_title: &'static str,
    pub metadata_mode: &'static str,
    pub metadata_years: &'static str,
    pub metadata_months: &'static str,
    pub metadata_projects: &'static str,
    pub all: &'static str,
    pub none: &'static str,
    pub not_available: &'static str,
    pub generated_on: &'static str,
    pub project_caption: &'static str,
    pub no_chart: &'static str,
    pub no_data: &'static str,
    pub reporting_hours_column: &'static str,
    pub baseline_hours_column: &'static str,
    pub delta_hours_column: &'static str,
    pub percent_change_column: &'static str,
}

impl Default for Labels {
    fn default() -> Self {
        Self::english()
    }
}

impl Labels {
    pub fn new(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Vi => Self::vietnamese(),
        }
    }

    pub fn english() -> Self {
        Self {
            locale: Locale::En,
            report_title: "TIME REPORT - COMPARISON",
            sheet_name: "Comparison Report",
            total: "Total",
            project_column: "Project Name",
            total_hours_column: "Total Hours",
            month_column: "Month",
            year_column: "Year",
            message_column: "Message",
            axis_project: "Project",
            axis_month: "Month",
            axis_year: "Year",
            axis_hours: "Hours",
            metadata_title: "Comparison Report",
            metadata_mode: "Comparison Mode",
            metadata_years: "Years",
            metadata_months: "Months",
            metadata_projects: "Projects",
            all: "All",
            none: "None",
            not_available: "N/A",
            generated_on: "Generated on",
            project_caption: "Project",
            no_chart: "No chart available for this report.",
            no_data: "No data to display",
            reporting_hours_column: "Reporting Month Hours",
            baseline_hours_column: "Baseline Month Hours",
            delta_hours_column: "Delta Hours",
            percent_change_column: "Percentage Change",
        }
    }

    pub fn vietnamese() -> Self {
        Self {
            locale: Locale::Vi,
            report_title: "BÁO CÁO THỜI GIAN - SO SÁNH",
            sheet_name: "Báo cáo So sánh",
            total: "Tổng",
            project_column: "Tên dự án",
            total_hours_column: "Tổng giờ",
            month_column: "Tháng",
            year_column: "Năm",
            message_column: "Thông báo",
            axis_project: "Dự án",
            axis_month: "Tháng",
            axis_year: "Năm",
            axis_hours: "Giờ",
            metadata_title: "Báo cáo so sánh",
            metadata_mode: "Chế độ so sánh",
            metadata_years: "Năm",
            metadata_months: "Tháng",
            metadata_projects: "Dự án",
            all: "Tất cả",
            none: "Không có",
            not_available: "Không áp dụng",
            generated_on: "Ngày tạo",
            project_caption: "Dự án",
            no_chart: "Không có biểu đồ cho báo cáo này.",
            no_data: "Không có dữ liệu để hiển thị",
            reporting_hours_column: "Giờ tháng báo cáo",
            baseline_hours_column: "Giờ tháng so sánh",
            delta_hours_column: "Chênh lệch giờ",
            percent_change_column: "Phần trăm thay đổi",
        }
    }

    /// Human-readable name of a comparison mode
    pub fn mode_name(&self, mode: ComparisonMode) -> &'static str {
        match (self.locale, mode) {
            (Locale::En, ComparisonMode::ProjectsInMonth) => "Compare Projects in a Month",
            (Locale::En, ComparisonMode::ProjectsInYear) => "Compare Projects in a Year",
            (Locale::En, ComparisonMode::ProjectOverTime) => "One Project Over Time",
            (Locale::Vi, ComparisonMode::ProjectsInMonth) => "So sánh dự án trong một tháng",
            (Locale::Vi, ComparisonMode::ProjectsInYear) => "So sánh dự án trong một năm",
            (Locale::Vi, ComparisonMode::ProjectOverTime) => "Một dự án theo thời gian",
        }
    }

    /// Header of the per-project hours column in over-time tables
    pub fn total_hours_for(&self, project: &str) -> String {
        match self.locale {
            Locale::En => format!("Total Hours for {project}"),
            Locale::Vi => format!("Tổng giờ cho {project}"),
        }
    }

    pub fn title_projects_in_month(&self, month: Month, year: i32) -> String {
        match self.locale {
            Locale::En => format!("Project Comparison - {month} {year}"),
            Locale::Vi => format!("So sánh dự án - {month} {year}"),
        }
    }

    pub fn title_projects_in_year(&self, year: i32) -> String {
        match self.locale {
            Locale::En => format!("Monthly Hours by Project - {year}"),
            Locale::Vi => format!("Giờ theo tháng của các dự án - {year}"),
        }
    }

    pub fn title_over_months(&self, project: &str, year: i32) -> String {
        match self.locale {
            Locale::En => format!("{project}: Hours by Month ({year})"),
            Locale::Vi => format!("{project}: Giờ theo tháng ({year})"),
        }
    }

    pub fn title_over_years(&self, project: &str) -> String {
        match self.locale {
            Locale::En => format!("{project}: Hours by Year"),
            Locale::Vi => format!("{project}: Giờ theo năm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parsing() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!(" vietnamese ".parse::<Locale>(), Ok(Locale::Vi));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn total_label_is_localized() {
        assert_eq!(Labels::new(Locale::En).total, "Total");
        assert_eq!(Labels::new(Locale::Vi).total, "Tổng");
    }

    #[test]
    fn templated_titles() {
        let labels = Labels::english();
        assert_eq!(
            labels.title_projects_in_month(Month::March, 2024),
            "Project Comparison - March 2024"
        );
        assert_eq!(labels.total_hours_for("Apollo"), "Total Hours for Apollo");
    }
}

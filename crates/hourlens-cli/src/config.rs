//! Report configuration file
//!
//! ```toml
//! [report]
//! locale = "vi"
//! title = "ACME Engineering - Hours"
//! logo = "assets/logo.png"
//! output_dir = "reports"
//!
//! [selection]
//! mode = "projects-in-year"
//! years = [2024]
//! projects = ["Apollo", "Gemini"]
//! ```
//!
//! Every key is optional. Command-line flags win over file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub report: ReportConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub locale: Option<String>,
    pub title: Option<String>,
    pub logo: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Kept as text so modes and months accept the same spellings as flags
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    pub mode: Option<String>,
    pub years: Vec<i32>,
    pub months: Vec<String>,
    pub projects: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        // Relative logo paths are relative to the config file
        if let (Some(logo), Some(base)) = (&config.report.logo, path.parent()) {
            if logo.is_relative() {
                config.report.logo = Some(base.join(logo));
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

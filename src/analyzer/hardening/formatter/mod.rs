//! Output formatters for hardening reports.

pub mod json;
pub mod plain;

use crate::analyzer::hardening::types::Report;
use serde::{Deserialize, Serialize};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of reports.
    #[default]
    Json,
    /// Human-readable summary.
    Plain,
}

/// Format reports to a string.
pub fn format_reports_to_string(reports: &[Report], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format(reports),
        OutputFormat::Plain => plain::format(reports),
    }
}

/// Format and print reports.
pub fn format_reports(reports: &[Report], format: OutputFormat) {
    print!("{}", format_reports_to_string(reports, format));
}

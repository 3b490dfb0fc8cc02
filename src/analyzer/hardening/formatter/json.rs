//! JSON formatter.

use crate::analyzer::hardening::types::Report;

/// Format reports as a pretty-printed JSON array.
pub fn format(reports: &[Report]) -> String {
    let mut output = serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string());
    output.push('\n');
    output
}

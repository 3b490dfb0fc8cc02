//! Plain text formatter.

use crate::analyzer::hardening::types::{Report, RuleRef};
use colored::Colorize;

/// Format reports as a human-readable summary.
pub fn format(reports: &[Report]) -> String {
    let mut output = String::new();

    for report in reports {
        let verdict = if !report.valid {
            "[INVALID]".yellow().bold()
        } else if report.score < 0 {
            "[CRITICAL]".red().bold()
        } else {
            "[PASSED]".green().bold()
        };
        output.push_str(&format!(
            "{} {} ({}): {}\n",
            verdict, report.object, report.file_name, report.message
        ));

        push_section(&mut output, "Critical", &report.scoring.critical);
        push_section(&mut output, "Passed", &report.scoring.passed);
        push_section(&mut output, "Advise", &report.scoring.advise);
    }

    let failing = reports.iter().filter(|r| r.is_failing()).count();
    if failing == 0 {
        output.push_str(&format!("\n{} resource(s) scanned, none failing.\n", reports.len()));
    } else {
        output.push_str(&format!(
            "\n{} resource(s) scanned, {} failing.\n",
            reports.len(),
            failing
        ));
    }

    output
}

fn push_section(output: &mut String, title: &str, rules: &[RuleRef]) {
    if rules.is_empty() {
        return;
    }
    output.push_str(&format!("  {}:\n", title.bold()));
    for rule in rules {
        output.push_str(&format!("    {:>4} {} - {}\n", rule.points, rule.id, rule.reason));
        if !rule.link.is_empty() {
            output.push_str(&format!("         {}\n", rule.link.dimmed()));
        }
    }
}

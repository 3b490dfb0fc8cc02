//! Handler for the `rules` command.

use crate::analyzer::hardening::{OutputFormat, Rule, catalog};
use crate::error::{HardenError, Result};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RuleEntry<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    points: i32,
    weight: i32,
    kinds: &'a [String],
    selector: &'a str,
    reason: &'a str,
    link: &'a str,
}

impl<'a> From<&'a Rule> for RuleEntry<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            id: &rule.id,
            points: rule.points,
            weight: rule.advise_weight,
            kinds: &rule.kinds,
            selector: &rule.selector,
            reason: &rule.reason,
            link: &rule.link,
        }
    }
}

/// Handle the `rules` command.
pub fn handle_rules(format: OutputFormat) -> Result<()> {
    print!("{}", format_rules(catalog(), format)?);
    Ok(())
}

/// Render a rule catalog.
pub fn format_rules(rules: &[Rule], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<RuleEntry<'_>> = rules.iter().map(RuleEntry::from).collect();
            let mut output = serde_json::to_string_pretty(&entries)
                .map_err(|e| HardenError::Output(e.to_string()))?;
            output.push('\n');
            Ok(output)
        }
        OutputFormat::Plain => {
            let mut output = String::new();
            for rule in rules {
                let points = if rule.points < 0 {
                    format!("{:>4}", rule.points).red()
                } else {
                    format!("{:>4}", rule.points).green()
                };
                output.push_str(&format!(
                    "{} {} [{}]\n    {}\n",
                    points,
                    rule.id.bold(),
                    rule.kinds.join(", "),
                    rule.reason
                ));
            }
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lists_every_rule() {
        let output = format_rules(catalog(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), catalog().len());
        assert_eq!(entries[0]["ID"], "Privileged");
        assert_eq!(entries[0]["Points"], -30);
    }

    #[test]
    fn test_plain_lists_kinds() {
        colored::control::set_override(false);
        let output = format_rules(catalog(), OutputFormat::Plain).unwrap();
        assert!(output.contains("ClusterAdmin [RoleBinding, ClusterRoleBinding]"));
    }
}

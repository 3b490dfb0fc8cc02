//! Aggregation of raw rule outcomes into a scored report.

use crate::analyzer::hardening::logging::emit;
use crate::analyzer::hardening::rules::{PredicateError, Rule};
use crate::analyzer::hardening::types::Report;
use log::{Level, Log};
use std::collections::HashSet;

/// Message for a document no catalog rule applies to.
pub const UNSUPPORTED_MESSAGE: &str = "resource kind not supported by the engine";

/// One rule's raw result against one document.
#[derive(Debug)]
pub struct Outcome<'r> {
    /// Position of the rule in the catalog.
    pub index: usize,
    pub rule: &'r Rule,
    pub result: Result<usize, PredicateError>,
}

/// Fold outcomes into the report's rules, buckets, score and message.
///
/// Outcomes are processed in catalog order regardless of arrival order.
/// Returns the number of applied rules.
pub fn aggregate(report: &mut Report, mut outcomes: Vec<Outcome<'_>>, logger: &dyn Log) -> usize {
    outcomes.sort_by_key(|o| o.index);

    let mut seen: HashSet<(String, usize)> = HashSet::new();
    let mut applied_rules = 0;

    for outcome in outcomes {
        let containers = match outcome.result {
            Ok(containers) => containers,
            Err(PredicateError::NotApplicable(_)) => continue,
            Err(err) => {
                emit(
                    logger,
                    Level::Warn,
                    format_args!("dropping result of rule {}: {}", outcome.rule.id, err),
                );
                continue;
            }
        };
        applied_rules += 1;

        let rule_ref = outcome.rule.to_ref(containers);
        let Some(bucket) = rule_ref.bucket() else {
            continue;
        };
        if seen.insert((rule_ref.id.clone(), rule_ref.containers)) {
            report.rules.push(rule_ref.clone());
        }
        if rule_ref.matched() {
            emit(
                logger,
                Level::Debug,
                format_args!(
                    "{} rule matched {} ({} points)",
                    bucket, rule_ref.selector, rule_ref.points
                ),
            );
            report.score += rule_ref.points;
        } else {
            emit(
                logger,
                Level::Debug,
                format_args!(
                    "positive score rule failed {} ({} points)",
                    rule_ref.selector, rule_ref.points
                ),
            );
        }
        report.scoring.bucket_mut(bucket).push(rule_ref);
    }

    report.message = verdict(applied_rules, report.score);
    report.scoring.sort();
    applied_rules
}

/// The report message for a finished evaluation.
pub fn verdict(applied_rules: usize, score: i32) -> String {
    if applied_rules == 0 {
        UNSUPPORTED_MESSAGE.to_string()
    } else if score >= 0 {
        format!("Passed with a score of {} points", score)
    } else {
        format!("Failed with a score of {} points", score)
    }
}

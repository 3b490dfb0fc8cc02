//! Core types for the hardening engine.
//!
//! - `RuleRef` - One rule's outcome against one document
//! - `RuleScoring` - The Critical / Passed / Advise buckets
//! - `Report` - The scored outcome for one manifest document
//! - `Bucket` - Classification of a single outcome

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The outcome of one catalog rule evaluated against one document.
///
/// Serialized with the field names consumers already parse
/// (`Containers`, `ID`, `Points`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleRef {
    /// Number of places in the document the rule matched.
    pub containers: usize,
    /// Rule identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Signed score delta of the rule.
    pub points: i32,
    /// Human explanation of why the rule matters.
    pub reason: String,
    /// Description of the inspected fields.
    pub selector: String,
    /// Advise priority; higher sorts first.
    pub weight: i32,
    /// Reference link, empty when the rule has none.
    #[serde(default)]
    pub link: String,
}

impl RuleRef {
    /// Whether the rule found at least one match.
    pub fn matched(&self) -> bool {
        self.containers > 0
    }

    /// Which bucket this outcome lands in, if any.
    ///
    /// A negative rule that did not match lands nowhere.
    pub fn bucket(&self) -> Option<Bucket> {
        match (self.matched(), self.points >= 0) {
            (true, true) => Some(Bucket::Passed),
            (true, false) => Some(Bucket::Critical),
            (false, true) => Some(Bucket::Advise),
            (false, false) => None,
        }
    }

    /// Ordering used inside every bucket: weight descending, then id ascending.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Classification of one rule outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// A negative rule matched.
    Critical,
    /// A non-negative rule matched.
    Passed,
    /// A non-negative rule did not match.
    Advise,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Passed => "passed",
            Self::Advise => "advise",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified rule outcomes for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleScoring {
    pub critical: Vec<RuleRef>,
    pub passed: Vec<RuleRef>,
    pub advise: Vec<RuleRef>,
}

impl RuleScoring {
    /// Total number of classified outcomes.
    pub fn len(&self) -> usize {
        self.critical.len() + self.passed.len() + self.advise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable access to the list backing a bucket.
    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<RuleRef> {
        match bucket {
            Bucket::Critical => &mut self.critical,
            Bucket::Passed => &mut self.passed,
            Bucket::Advise => &mut self.advise,
        }
    }

    /// Sort every bucket into priority order.
    pub fn sort(&mut self) {
        self.critical.sort_by(RuleRef::priority_cmp);
        self.passed.sort_by(RuleRef::priority_cmp);
        self.advise.sort_by(RuleRef::priority_cmp);
    }
}

/// The scored outcome for one manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    /// `<kind>/<name>.<namespace>` identity of the document.
    pub object: String,
    /// Label of the file the document came from.
    pub file_name: String,
    /// Verdict or validation message.
    pub message: String,
    /// Sum of points over Critical and Passed.
    pub score: i32,
    /// Whether the document passed schema validation.
    pub valid: bool,
    /// Every distinct outcome produced for this document.
    pub rules: Vec<RuleRef>,
    pub scoring: RuleScoring,
}

impl Report {
    /// Create an empty, not-yet-valid report.
    pub fn new(file_name: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            file_name: file_name.into(),
            message: String::new(),
            score: 0,
            valid: false,
            rules: Vec::new(),
            scoring: RuleScoring::default(),
        }
    }

    /// Whether the report counts as a failure for exit-code purposes.
    pub fn is_failing(&self) -> bool {
        !self.valid || self.score < 0
    }
}

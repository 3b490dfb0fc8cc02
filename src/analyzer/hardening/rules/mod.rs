//! The hardening rule catalog.
//!
//! Every rule is a plain value binding an identifier, the kinds it applies
//! to, and a score delta to a predicate. Predicates are pure: they read
//! the shared document and report how many places matched.

pub mod builtin;
pub mod extract;
pub mod rbac;
pub mod workload;

use crate::analyzer::hardening::parser::Document;
use crate::analyzer::hardening::types::RuleRef;
use std::fmt;
use std::sync::OnceLock;

/// Outcome of a predicate that did not produce a match count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// The rule's kinds exclude the document's kind.
    #[error("rule does not apply to kind {0}")]
    NotApplicable(String),
    /// The predicate broke its contract.
    #[error("predicate failed: {0}")]
    Failed(String),
}

/// A capability that counts matches in a document.
pub trait Predicate: Send + Sync {
    /// Count the places in the document this predicate matches.
    fn matches(&self, document: &serde_json::Value) -> Result<usize, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(&serde_json::Value) -> usize + Send + Sync,
{
    fn matches(&self, document: &serde_json::Value) -> Result<usize, PredicateError> {
        Ok(self(document))
    }
}

/// A catalog entry.
pub struct Rule {
    pub id: String,
    /// Inspected fields; documentation only.
    pub selector: String,
    pub reason: String,
    /// Resource kinds this rule applies to.
    pub kinds: Vec<String>,
    /// Score delta applied when the rule matches.
    pub points: i32,
    /// Advise priority; higher sorts first.
    pub advise_weight: i32,
    pub link: String,
    pub predicate: Box<dyn Predicate>,
}

impl Rule {
    /// Create a rule without kinds; see [`Rule::with_kinds`].
    pub fn new(
        id: impl Into<String>,
        selector: impl Into<String>,
        reason: impl Into<String>,
        points: i32,
        predicate: impl Predicate + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
            reason: reason.into(),
            kinds: Vec::new(),
            points,
            advise_weight: 0,
            link: String::new(),
            predicate: Box::new(predicate),
        }
    }

    /// Set the applicable kinds.
    pub fn with_kinds(mut self, kinds: &[&str]) -> Self {
        self.kinds = kinds.iter().map(|k| (*k).to_string()).collect();
        self
    }

    /// Set the advise priority.
    pub fn with_advise_weight(mut self, weight: i32) -> Self {
        self.advise_weight = weight;
        self
    }

    /// Set the reference link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Whether the rule applies to a resource kind.
    pub fn applies_to(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }

    /// Run the rule against a document, honouring its kind filter.
    pub fn eval(&self, document: &Document) -> Result<usize, PredicateError> {
        let kind = document.kind().unwrap_or_default();
        if !self.applies_to(kind) {
            return Err(PredicateError::NotApplicable(kind.to_string()));
        }
        self.predicate.matches(&document.value)
    }

    /// Record a match count as a per-document outcome.
    pub fn to_ref(&self, containers: usize) -> RuleRef {
        RuleRef {
            containers,
            id: self.id.clone(),
            points: self.points,
            reason: self.reason.clone(),
            selector: self.selector.clone(),
            weight: self.advise_weight,
            link: self.link.clone(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .field("points", &self.points)
            .field("advise_weight", &self.advise_weight)
            .finish_non_exhaustive()
    }
}

/// Process-wide built-in catalog.
static CATALOG: OnceLock<Vec<Rule>> = OnceLock::new();

/// Get the built-in catalog, building it on first use.
pub fn catalog() -> &'static [Rule] {
    CATALOG.get_or_init(builtin::builtin_rules)
}

/// Look up a built-in rule by id.
pub fn get_rule(id: &str) -> Option<&'static Rule> {
    catalog().iter().find(|r| r.id == id)
}

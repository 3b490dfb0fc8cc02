//! Evaluation of the rule catalog against one document.

use crate::analyzer::hardening::config::SchemaConfig;
use crate::analyzer::hardening::logging::emit;
use crate::analyzer::hardening::parser::Document;
use crate::analyzer::hardening::rules::Rule;
use crate::analyzer::hardening::schema::SchemaValidator;
use crate::analyzer::hardening::scoring::{Outcome, aggregate};
use crate::analyzer::hardening::types::Report;
use crossbeam::channel;
use log::{Level, Log};
use serde_json::Value;

/// Message for a document whose schema could not be found.
pub const UNKNOWN_SCHEMA_MESSAGE: &str = "This resource is invalid, unknown schema";

/// Message for a document without a resolvable kind.
pub const KIND_NOT_FOUND_MESSAGE: &str = "This resource is invalid, Kubernetes kind not found";

/// Render a value the way it appears in an object identity.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compute `<kind>/<name>.<namespace>` for a document.
///
/// A document that is not an object or has no kind is `Unknown`.
pub fn object_name(document: &Value) -> String {
    let Some(object) = document.as_object() else {
        return "Unknown".to_string();
    };
    let Some(kind) = object.get("kind").filter(|k| !k.is_null()) else {
        return "Unknown".to_string();
    };

    let metadata = object.get("metadata");
    let name = metadata
        .and_then(|m| m.get("name"))
        .filter(|v| !v.is_null())
        .map(display_value)
        .unwrap_or_else(|| "undefined".to_string());
    let namespace = metadata
        .and_then(|m| m.get("namespace"))
        .filter(|v| !v.is_null())
        .map(display_value)
        .unwrap_or_else(|| "default".to_string());

    format!("{}/{}.{}", display_value(kind), name, namespace)
}

/// Evaluates one document: validation, concurrent dispatch, aggregation.
pub struct Evaluator<'r> {
    rules: &'r [Rule],
    validator: &'r dyn SchemaValidator,
    logger: &'r dyn Log,
}

impl<'r> Evaluator<'r> {
    pub fn new(rules: &'r [Rule], validator: &'r dyn SchemaValidator, logger: &'r dyn Log) -> Self {
        Self {
            rules,
            validator,
            logger,
        }
    }

    /// Build the report for one document.
    pub fn evaluate(&self, file_name: &str, document: &Document, config: &SchemaConfig) -> Report {
        let mut report = Report::new(file_name, object_name(&document.value));

        if let Some(message) = self.validation_message(file_name, document, config) {
            emit(
                self.logger,
                Level::Debug,
                format_args!("{} is invalid: {}", report.object, message),
            );
            report.message = message;
            return report;
        }
        report.valid = true;

        let outcomes = self.dispatch(document);
        aggregate(&mut report, outcomes, self.logger);
        report
    }

    /// Run the schema validator; `Some` carries the message of an invalid
    /// document.
    fn validation_message(
        &self,
        file_name: &str,
        document: &Document,
        config: &SchemaConfig,
    ) -> Option<String> {
        let results = match self.validator.validate(document, file_name, config) {
            Ok(results) => results,
            Err(err) if err.is_not_found() => return Some(UNKNOWN_SCHEMA_MESSAGE.to_string()),
            Err(err) => return Some(err.to_string()),
        };

        let mut message = String::new();
        for result in &results {
            if !result.errors.is_empty() {
                for error in &result.errors {
                    message.push_str(&error.to_string());
                    message.push(' ');
                }
            } else if result.kind.is_empty() {
                message.push_str(KIND_NOT_FOUND_MESSAGE);
            }
        }

        if message.is_empty() {
            None
        } else {
            Some(message.trim_end().to_string())
        }
    }

    /// Run every rule concurrently against the document and collect the
    /// results once all of them have finished.
    pub fn dispatch(&self, document: &Document) -> Vec<Outcome<'r>> {
        // Capacity equals the task count so senders never block.
        let (sender, receiver) = channel::bounded(self.rules.len());

        rayon::scope(|scope| {
            for (index, rule) in self.rules.iter().enumerate() {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let result = rule.eval(document);
                    // The receiver outlives the scope, so this cannot fail.
                    let _ = sender.send(Outcome { index, rule, result });
                });
            }
        });
        drop(sender);

        receiver.try_iter().collect()
    }
}

//! Orchestration of a hardening run over raw manifest bytes.

use crate::analyzer::hardening::config::SchemaConfig;
use crate::analyzer::hardening::evaluate::Evaluator;
use crate::analyzer::hardening::logging::{SharedLogger, emit, facade};
use crate::analyzer::hardening::parser::{DocumentSplitter, SplitError};
use crate::analyzer::hardening::rules::{Rule, catalog};
use crate::analyzer::hardening::schema::{KubernetesValidator, SchemaValidator};
use crate::analyzer::hardening::types::Report;
use log::Level;
use std::sync::Arc;

/// Error returned by [`Ruleset::run`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// No usable document anywhere in the input.
    #[error("Invalid input")]
    InvalidInput,

    /// A document could not be converted; `reports` holds the reports built
    /// for the documents before it.
    #[error("failed to convert document {document}: {message}")]
    Conversion {
        document: usize,
        message: String,
        reports: Vec<Report>,
    },
}

impl RunError {
    /// Reports completed before the failure.
    pub fn partial_reports(&self) -> &[Report] {
        match self {
            Self::InvalidInput => &[],
            Self::Conversion { reports, .. } => reports,
        }
    }

    /// Take ownership of the reports completed before the failure.
    pub fn into_partial_reports(self) -> Vec<Report> {
        match self {
            Self::InvalidInput => Vec::new(),
            Self::Conversion { reports, .. } => reports,
        }
    }
}

/// A rule catalog bound to a schema validator and a logger.
pub struct Ruleset<'r> {
    rules: &'r [Rule],
    validator: Arc<dyn SchemaValidator>,
    /// The validator is the built-in one and follows `with_logger`.
    builtin_validator: bool,
    logger: SharedLogger,
}

impl Default for Ruleset<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Ruleset<'static> {
    /// The built-in catalog with the Kubernetes schema validator.
    pub fn new() -> Self {
        Self {
            rules: catalog(),
            validator: Arc::new(KubernetesValidator::new()),
            builtin_validator: true,
            logger: facade(),
        }
    }
}

impl<'r> Ruleset<'r> {
    /// Replace the rule catalog.
    pub fn with_rules<'a>(self, rules: &'a [Rule]) -> Ruleset<'a> {
        Ruleset {
            rules,
            validator: self.validator,
            builtin_validator: self.builtin_validator,
            logger: self.logger,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self.builtin_validator = false;
        self
    }

    /// Route engine diagnostics to `logger`, including those of the
    /// built-in validator.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        if self.builtin_validator {
            self.validator = Arc::new(KubernetesValidator::new().with_logger(Arc::clone(&logger)));
        }
        self.logger = logger;
        self
    }

    /// Split `input` into documents and build one report per document, in
    /// source order.
    pub fn run(
        &self,
        file_name: &str,
        input: &[u8],
        config: &SchemaConfig,
    ) -> Result<Vec<Report>, RunError> {
        let evaluator = Evaluator::new(self.rules, self.validator.as_ref(), self.logger.as_ref());
        let mut reports = Vec::new();

        for document in DocumentSplitter::new(input).with_logger(self.logger.as_ref()) {
            let document = match document {
                Ok(document) => document,
                Err(SplitError::InvalidInput) => return Err(RunError::InvalidInput),
                Err(SplitError::Conversion { document, message }) => {
                    emit(
                        self.logger.as_ref(),
                        Level::Debug,
                        format_args!(
                            "{}: stopping after {} reports, document {} failed: {}",
                            file_name,
                            reports.len(),
                            document,
                            message
                        ),
                    );
                    return Err(RunError::Conversion {
                        document,
                        message,
                        reports,
                    });
                }
            };

            let report = evaluator.evaluate(file_name, &document, config);
            emit(
                self.logger.as_ref(),
                Level::Debug,
                format_args!("{}: {}", report.object, report.message),
            );
            reports.push(report);
        }

        Ok(reports)
    }
}

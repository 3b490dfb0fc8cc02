//! Kubernetes manifest hardening engine.
//!
//! Scores Kubernetes manifests against a catalog of security rules. Each
//! document in the input becomes one [`Report`] carrying a score, a verdict
//! message and the rule outcomes split into Critical, Passed and Advise.
//!
//! # Pipeline
//!
//! 1. The input is split into documents (JSON, or YAML separated by `---`).
//! 2. Each document is checked against its Kubernetes schema.
//! 3. Every catalog rule runs concurrently against a valid document.
//! 4. Results are classified, scored and sorted into the report.
//!
//! # Example
//!
//! ```rust,ignore
//! use k8s_harden::analyzer::hardening::{Ruleset, SchemaConfig};
//!
//! let manifest = std::fs::read("deployment.yaml")?;
//! let reports = Ruleset::new().run("deployment.yaml", &manifest, &SchemaConfig::default())?;
//!
//! for report in reports {
//!     println!("{}: {}", report.object, report.message);
//! }
//! ```
//!
//! # Rules
//!
//! ## Workload Rules
//! - Privileged containers, CAP_SYS_ADMIN, container runtime socket mounts
//! - Host namespace sharing (network, PID, IPC)
//! - Non-root users, read-only root filesystem, dropped capabilities
//! - Resource limits and requests
//! - Service account settings and seccomp profiles
//!
//! ## RBAC Rules
//! - Cluster admin bindings
//! - Wildcard permissions
//! - Access to pods/exec, events, CRDs, secrets and persistent volumes
//! - Impersonation and default namespace placement

pub mod config;
pub mod evaluate;
pub mod formatter;
pub mod logging;
pub mod parser;
pub mod rules;
pub mod ruleset;
pub mod schema;
pub mod scoring;
pub mod types;

pub use config::SchemaConfig;
pub use evaluate::{Evaluator, object_name};
pub use formatter::{OutputFormat, format_reports, format_reports_to_string};
pub use logging::{FacadeLogger, SharedLogger};
pub use parser::{Document, DocumentSplitter, SplitError, split_documents};
pub use rules::{Predicate, PredicateError, Rule, catalog, get_rule};
pub use ruleset::{RunError, Ruleset};
pub use schema::{FieldError, KubernetesValidator, SchemaError, SchemaValidator, ValidationResult};
pub use types::{Bucket, Report, RuleRef, RuleScoring};

//! Configuration for the hardening engine.
//!
//! The schema configuration is forwarded to the schema validator as-is;
//! the engine itself never reads it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Well-known location of a pre-installed schema bundle.
pub const DEFAULT_SCHEMA_ROOT: &str = "/schemas";

/// Directory inside the bundle whose presence marks the default root as usable.
const DEFAULT_SCHEMA_MARKER: &str = "kubernetes-json-schema/master/master-standalone";

/// Kubernetes version used to pick a schema directory inside a bundle.
pub const DEFAULT_KUBERNETES_VERSION: &str = "master";

/// Where the schema validator should look for schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    /// Explicit local schema bundle.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    /// Kubernetes version directory to use inside the bundle.
    #[serde(default = "default_version")]
    pub kubernetes_version: String,

    /// Reject fields the schema does not declare.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_version() -> String {
    DEFAULT_KUBERNETES_VERSION.to_string()
}

fn default_strict() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            kubernetes_version: default_version(),
            strict: default_strict(),
        }
    }
}

impl SchemaConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a local schema bundle.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }

    /// Set the Kubernetes version directory.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.kubernetes_version = version.into();
        self
    }

    /// Toggle strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve the bundle root to read schemas from.
    ///
    /// An explicit directory wins; otherwise the well-known root is used when
    /// it is installed. `None` means the validator falls back to its
    /// built-in structural checks.
    pub fn resolve_schema_root(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.schema_dir {
            return Some(dir.clone());
        }
        let root = Path::new(DEFAULT_SCHEMA_ROOT);
        if root.join(DEFAULT_SCHEMA_MARKER).exists() {
            Some(root.to_path_buf())
        } else {
            None
        }
    }
}

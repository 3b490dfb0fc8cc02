use crate::analyzer::hardening::{OutputFormat, SchemaConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Exit code used when any scanned resource fails.
pub const DEFAULT_EXIT_CODE: i32 = 2;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Local schema bundle directory
    pub schema_dir: Option<PathBuf>,
    /// Kubernetes version of the schemas to validate against
    pub kubernetes_version: String,
    /// Reject fields unknown to the schema
    pub strict: bool,
    /// Output format for scan results
    pub format: OutputFormat,
    /// Process exit code when a resource is invalid or fails
    pub exit_code: i32,
}

impl Default for Config {
    fn default() -> Self {
        let schema = SchemaConfig::default();
        Self {
            schema_dir: schema.schema_dir,
            kubernetes_version: schema.kubernetes_version,
            strict: schema.strict,
            format: OutputFormat::default(),
            exit_code: DEFAULT_EXIT_CODE,
        }
    }
}

impl Config {
    /// The schema settings handed to the engine.
    pub fn schema_config(&self) -> SchemaConfig {
        let mut config = SchemaConfig::new()
            .with_version(self.kubernetes_version.clone())
            .with_strict(self.strict);
        if let Some(dir) = &self.schema_dir {
            config = config.with_schema_dir(dir.clone());
        }
        config
    }
}

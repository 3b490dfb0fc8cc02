//! # k8s-harden
//!
//! A command-line tool and library that scores Kubernetes manifests against
//! security hardening rules.
//!
//! ## Features
//!
//! - **Multi-document input**: JSON or YAML streams separated by `---`
//! - **Schema validation**: Checks each resource against its Kubernetes JSON schema
//! - **Rule scoring**: Workload and RBAC rules evaluated concurrently per resource
//! - **Prioritised advice**: Critical, passed and advised rules ordered by weight
//!
//! ## Example
//!
//! ```rust,no_run
//! use k8s_harden::analyzer::hardening::{Ruleset, SchemaConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = std::fs::read("deployment.yaml")?;
//! let reports = Ruleset::new().run("deployment.yaml", &manifest, &SchemaConfig::default())?;
//! for report in &reports {
//!     println!("{} {}", report.object, report.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::hardening::{Report, RuleRef, RunError, Ruleset, SchemaConfig};
pub use error::{HardenError, Result};
use cli::{Cli, Commands};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a parsed command line. Returns the process exit code.
pub fn run_command(cli: Cli) -> Result<i32> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(std::env::current_dir().ok().as_deref())?,
    };

    match cli.command {
        Commands::Scan {
            paths,
            format,
            schema_dir,
            kubernetes_version,
            no_strict,
            exit_code,
        } => {
            if let Some(dir) = schema_dir {
                config.schema_dir = Some(dir);
            }
            if let Some(version) = kubernetes_version {
                config.kubernetes_version = version;
            }
            if no_strict {
                config.strict = false;
            }
            let options = handlers::ScanOptions {
                paths,
                format: format.map(Into::into).unwrap_or(config.format),
                schema: config.schema_config(),
                exit_code: exit_code.unwrap_or(config.exit_code),
            };
            handlers::handle_scan(options)
        }
        Commands::Rules { format } => handlers::handle_rules(format.into()).map(|_| 0),
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "k8s-harden")]
#[command(version = crate::VERSION)]
#[command(about = "Score Kubernetes manifests against security hardening rules")]
#[command(long_about = "Validates Kubernetes manifests against their schemas and scores every resource against a catalog of workload and RBAC hardening rules, reporting critical findings, passed checks and advice.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan manifest files, directories or stdin
    Scan {
        /// Files or directories to scan; `-` reads from stdin
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Local Kubernetes JSON schema bundle
        #[arg(long, value_name = "DIR", env = "K8S_HARDEN_SCHEMA_DIR")]
        schema_dir: Option<PathBuf>,

        /// Kubernetes version of the schemas to validate against
        #[arg(long, value_name = "VERSION")]
        kubernetes_version: Option<String>,

        /// Allow fields the schema does not declare
        #[arg(long)]
        no_strict: bool,

        /// Exit code when any resource is invalid or fails
        #[arg(long, value_name = "CODE")]
        exit_code: Option<i32>,
    },

    /// List the built-in hardening rules
    Rules {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Plain,
}

impl From<OutputFormat> for crate::analyzer::hardening::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Plain => Self::Plain,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

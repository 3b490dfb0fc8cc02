use crate::analyzer::hardening::RunError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HardenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Run(#[from] RunError),

    #[error("Failed to read {path}: {message}")]
    Input { path: PathBuf, message: String },

    #[error("No manifests found in {0}")]
    NoManifests(PathBuf),

    #[error("Output error: {0}")]
    Output(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {0}")]
    ReadFailed(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),
}

pub type Result<T> = std::result::Result<T, HardenError>;

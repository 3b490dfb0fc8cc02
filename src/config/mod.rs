pub mod types;

use crate::error::{ConfigError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub use types::Config;

const CONFIG_FILE_NAME: &str = ".k8s-harden.toml";

/// Get the global config file path (~/.k8s-harden.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.k8s-harden.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from a specific file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| ConfigError::ReadFailed(path.to_path_buf()))?;
    let config = toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    debug!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Load configuration from file or use defaults
/// Checks local config first, then global config
pub fn load_config(project_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = project_path {
        let local = local_config_path(path);
        if local.exists() {
            return load_config_file(&local);
        }
    }

    if let Some(global) = global_config_path()
        && global.exists()
    {
        return load_config_file(&global);
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::hardening::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_local_config_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            local_config_path(dir.path()),
            "schema-dir = \"/opt/schemas\"\nformat = \"plain\"\nexit-code = 3\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.schema_dir, Some(PathBuf::from("/opt/schemas")));
        assert_eq!(config.format, OutputFormat::Plain);
        assert_eq!(config.exit_code, 3);
        assert!(config.strict);
        assert_eq!(config.kubernetes_version, "master");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "exit-code = \"three\"\n").unwrap();
        assert!(load_config_file(&path).is_err());
    }

    #[test]
    fn test_schema_config_carries_overrides() {
        let config = Config {
            schema_dir: Some(PathBuf::from("/s")),
            kubernetes_version: "v1.29.0".to_string(),
            strict: false,
            ..Config::default()
        };
        let schema = config.schema_config();
        assert_eq!(schema.schema_dir, Some(PathBuf::from("/s")));
        assert_eq!(schema.kubernetes_version, "v1.29.0");
        assert!(!schema.strict);
    }
}

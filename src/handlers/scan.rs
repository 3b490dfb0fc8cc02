//! Handler for the `scan` command.
//!
//! Reads manifests from files, directories and stdin, scores every
//! document and prints the reports.

use crate::analyzer::hardening::{OutputFormat, Report, Ruleset, SchemaConfig, format_reports};
use crate::error::{HardenError, Result};
use log::{debug, error, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Label used for manifests read from stdin.
pub const STDIN_LABEL: &str = "STDIN";

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Options for the scan command
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub schema: SchemaConfig,
    /// Exit code when any resource is invalid or fails
    pub exit_code: i32,
}

/// Outcome of scanning every input.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub reports: Vec<Report>,
    /// Inputs that could not be read or split completely.
    pub errors: usize,
}

impl ScanOutcome {
    pub fn is_failing(&self) -> bool {
        self.errors > 0 || self.reports.iter().any(Report::is_failing)
    }
}

/// Handle the `scan` command. Returns the process exit code.
pub fn handle_scan(options: ScanOptions) -> Result<i32> {
    let ruleset = Ruleset::new();
    let outcome = scan_inputs(&ruleset, &options.paths, &options.schema)?;

    format_reports(&outcome.reports, options.format);

    if outcome.is_failing() {
        info!(
            "{} report(s), {} input error(s); exiting with {}",
            outcome.reports.len(),
            outcome.errors,
            options.exit_code
        );
        Ok(options.exit_code)
    } else {
        Ok(0)
    }
}

/// Scan every input path and collect the reports in input order.
pub fn scan_inputs(ruleset: &Ruleset<'_>, paths: &[PathBuf], schema: &SchemaConfig) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();

    for path in paths {
        for (label, content) in read_inputs(path)? {
            match ruleset.run(&label, &content, schema) {
                Ok(reports) => outcome.reports.extend(reports),
                Err(err) => {
                    error!("{}: {}", label, err);
                    outcome.errors += 1;
                    outcome.reports.extend(err.into_partial_reports());
                }
            }
        }
    }

    Ok(outcome)
}

/// Read one command-line input into `(label, bytes)` pairs.
fn read_inputs(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    if path.as_os_str() == "-" {
        let mut content = Vec::new();
        io::stdin().read_to_end(&mut content)?;
        return Ok(vec![(STDIN_LABEL.to_string(), content)]);
    }

    if path.is_dir() {
        let files = manifest_files(path);
        if files.is_empty() {
            return Err(HardenError::NoManifests(path.to_path_buf()));
        }
        return files
            .into_iter()
            .map(|file| {
                let content = read_file(&file)?;
                Ok((file.display().to_string(), content))
            })
            .collect();
    }

    Ok(vec![(path.display().to_string(), read_file(path)?)])
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    debug!("reading {}", path.display());
    fs::read(path).map_err(|e| HardenError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Find manifest files under a directory, sorted by path.
pub fn manifest_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POD: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\nspec:\n  containers:\n    - name: app\n      image: nginx\n";

    #[test]
    fn test_manifest_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yaml"), POD).unwrap();
        fs::write(dir.path().join("a.yml"), POD).unwrap();
        fs::write(dir.path().join("nested/c.json"), "{}").unwrap();
        fs::write(dir.path().join("README.md"), "# docs").unwrap();

        let files = manifest_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.yml", "b.yaml", "nested/c.json"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = read_inputs(dir.path()).unwrap_err();
        assert!(matches!(err, HardenError::NoManifests(_)));
    }

    #[test]
    fn test_scan_keeps_partial_reports() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mixed.yaml");
        fs::write(&file, format!("{}---\nkey: [unclosed\n", POD)).unwrap();

        let schemas = SchemaConfig::new()
            .with_schema_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schemas"));
        let outcome = scan_inputs(&Ruleset::new(), &[file], &schemas).unwrap();
        assert!(outcome.reports[0].valid);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.errors, 1);
        assert!(outcome.is_failing());
    }
}

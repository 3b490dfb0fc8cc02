//! Schema validation of manifest documents.
//!
//! The engine only depends on the [`SchemaValidator`] trait. The bundled
//! [`KubernetesValidator`] reads standalone JSON schemas from a local bundle
//! laid out like `kubernetes-json-schema`:
//!
//! ```text
//! <root>/kubernetes-json-schema/<version>/<version>-standalone[-strict]/<kind>[-<group>]-<apiversion>.json
//! ```
//!
//! and checks the subset of JSON schema those files use. Without a bundle it
//! falls back to structural checks on `kind`, `apiVersion` and `metadata`.

use crate::analyzer::hardening::config::SchemaConfig;
use crate::analyzer::hardening::logging::{SharedLogger, emit, facade};
use crate::analyzer::hardening::parser::Document;
use log::Level;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Errors that stop validation of a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No schema exists for the document's kind and version.
    #[error("could not find schema for {kind} at {}", path.display())]
    NotFound { kind: String, path: PathBuf },
    /// The schema file could not be read.
    #[error("failed to read schema {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    /// The schema file is not valid JSON.
    #[error("schema {} is malformed: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}

impl SchemaError {
    /// Whether this error means the schema does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A single field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field, `(root)` for the document itself.
    pub field: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.description)
    }
}

/// Validation outcome for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub file_name: String,
    /// Resolved kind; empty when the document has none.
    pub kind: String,
    pub api_version: String,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !self.kind.is_empty()
    }
}

/// Validates documents against Kubernetes API schemas.
pub trait SchemaValidator: Send + Sync {
    fn validate(
        &self,
        document: &Document,
        file_name: &str,
        config: &SchemaConfig,
    ) -> Result<Vec<ValidationResult>, SchemaError>;
}

/// Validator backed by a local schema bundle.
pub struct KubernetesValidator {
    cache: Mutex<HashMap<PathBuf, Arc<Value>>>,
    logger: SharedLogger,
}

impl Default for KubernetesValidator {
    fn default() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            logger: facade(),
        }
    }
}

impl fmt::Debug for KubernetesValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubernetesValidator").finish_non_exhaustive()
    }
}

impl KubernetesValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route diagnostics to an injected logger.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Path of the schema file for a kind and apiVersion.
    pub fn schema_path(root: &Path, config: &SchemaConfig, kind: &str, api_version: &str) -> PathBuf {
        let version = &config.kubernetes_version;
        let strict_suffix = if config.strict { "-strict" } else { "" };

        let (group, api) = match api_version.split_once('/') {
            Some((group, api)) => (group.split('.').next().unwrap_or(group), api),
            None => ("", api_version),
        };
        let file = if group.is_empty() {
            format!("{}-{}.json", kind.to_lowercase(), api)
        } else {
            format!("{}-{}-{}.json", kind.to_lowercase(), group.to_lowercase(), api)
        };

        root.join("kubernetes-json-schema")
            .join(version)
            .join(format!("{}-standalone{}", version, strict_suffix))
            .join(file)
    }

    fn load_schema(&self, path: &Path, kind: &str) -> Result<Arc<Value>, SchemaError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(schema) = cache.get(path) {
                return Ok(Arc::clone(schema));
            }
        }

        if !path.exists() {
            return Err(SchemaError::NotFound {
                kind: kind.to_string(),
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        emit(
            self.logger.as_ref(),
            Level::Debug,
            format_args!("loaded schema {}", path.display()),
        );

        let schema = Arc::new(schema);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(path.to_path_buf(), Arc::clone(&schema));
        }
        Ok(schema)
    }
}

impl SchemaValidator for KubernetesValidator {
    fn validate(
        &self,
        document: &Document,
        file_name: &str,
        config: &SchemaConfig,
    ) -> Result<Vec<ValidationResult>, SchemaError> {
        let mut result = ValidationResult {
            file_name: file_name.to_string(),
            ..Default::default()
        };

        let Some(object) = document.value.as_object() else {
            return Ok(vec![result]);
        };
        let Some(kind) = object.get("kind").and_then(Value::as_str) else {
            return Ok(vec![result]);
        };
        result.kind = kind.to_string();

        match object.get("apiVersion").and_then(Value::as_str) {
            Some(api_version) => result.api_version = api_version.to_string(),
            None => {
                result
                    .errors
                    .push(FieldError::new("(root)", "apiVersion is required"));
                return Ok(vec![result]);
            }
        }

        match config.resolve_schema_root() {
            Some(root) => {
                let path = Self::schema_path(&root, config, kind, &result.api_version);
                emit(
                    self.logger.as_ref(),
                    Level::Trace,
                    format_args!("validating {} against {}", kind, path.display()),
                );
                let schema = self.load_schema(&path, kind)?;
                check(&schema, &document.value, "(root)", &mut result.errors);
            }
            None => structural_checks(object, &mut result.errors),
        }

        Ok(vec![result])
    }
}

/// Checks applied when no schema bundle is available.
fn structural_checks(object: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    match object.get("metadata") {
        None => {}
        Some(Value::Object(metadata)) => {
            for key in ["name", "namespace"] {
                if let Some(value) = metadata.get(key) {
                    if !value.is_string() {
                        errors.push(FieldError::new(
                            format!("metadata.{}", key),
                            format!("Invalid type. Expected: string, given: {}", type_name(value)),
                        ));
                    }
                }
            }
        }
        Some(other) => errors.push(FieldError::new(
            "metadata",
            format!("Invalid type. Expected: object, given: {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        other => type_name(value) == other,
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent == "(root)" {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Check a value against the JSON schema subset used by Kubernetes
/// standalone schemas.
fn check(schema: &Value, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        let allowed: Vec<&str> = match expected {
            Value::String(t) => vec![t.as_str()],
            Value::Array(types) => types.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.is_empty() && !allowed.iter().any(|t| type_matches(t, value)) {
            errors.push(FieldError::new(
                path,
                format!(
                    "Invalid type. Expected: {}, given: {}",
                    allowed.join("/"),
                    type_name(value)
                ),
            ));
            return;
        }
    }

    for key in ["oneOf", "anyOf"] {
        if let Some(branches) = schema.get(key).and_then(Value::as_array) {
            let any_ok = branches.iter().any(|branch| {
                let mut scratch = Vec::new();
                check(branch, value, path, &mut scratch);
                scratch.is_empty()
            });
            if !any_ok {
                errors.push(FieldError::new(path, format!("Must validate {} schema", key)));
            }
        }
    }

    if let Some(options) = schema.get("enum").and_then(Value::as_array) {
        if !options.contains(value) {
            let listed: Vec<String> = options.iter().map(Value::to_string).collect();
            errors.push(FieldError::new(
                path,
                format!("{} must be one of the following: {}", path, listed.join(", ")),
            ));
        }
    }

    if let Value::Object(object) = value {
        check_object(schema, object, path, errors);
    }

    if let (Value::Array(items), Some(item_schema)) = (value, schema.get("items")) {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{}.{}", path, i), errors);
        }
    }
}

fn check_object(
    schema: &Map<String, Value>,
    object: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                errors.push(FieldError::new(path, format!("{} is required", key)));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties");

    for (key, child) in object {
        let field = child_path(path, key);
        match properties.and_then(|p| p.get(key)) {
            Some(child_schema) => check(child_schema, child, &field, errors),
            None => match additional {
                Some(Value::Bool(false)) => errors.push(FieldError::new(
                    path,
                    format!("Additional property {} is not allowed", key),
                )),
                Some(extra @ Value::Object(_)) => check(extra, child, &field, errors),
                _ => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::hardening::logging::capture::CaptureLogger;
    use crate::analyzer::hardening::parser::split_documents;
    use serde_json::json;
    use tempfile::TempDir;

    fn document(yaml: &str) -> Document {
        split_documents(yaml.as_bytes()).unwrap().remove(0)
    }

    fn write_schema(root: &Path, file: &str, schema: &Value) {
        let dir = root.join("kubernetes-json-schema/master/master-standalone-strict");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), serde_json::to_string(schema).unwrap()).unwrap();
    }

    fn pod_schema() -> Value {
        json!({
            "type": "object",
            "required": ["apiVersion", "kind"],
            "additionalProperties": false,
            "properties": {
                "apiVersion": {"type": ["string", "null"]},
                "kind": {"type": "string", "enum": ["Pod"]},
                "metadata": {"type": "object"},
                "spec": {
                    "type": "object",
                    "properties": {
                        "hostPID": {"type": "boolean"},
                        "containers": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": {"type": "string"},
                                    "ports": {"type": "array", "items": {"type": "object", "properties": {
                                        "containerPort": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
                                    }}}
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_schema_loads_reach_injected_logger() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "pod-v1.json", &pod_schema());
        let logger = Arc::new(CaptureLogger::default());
        let validator = KubernetesValidator::new().with_logger(logger.clone());
        let config = SchemaConfig::default().with_schema_dir(dir.path());
        let pod = document("apiVersion: v1\nkind: Pod\nmetadata:\n  name: a\n");

        validator.validate(&pod, "a.yaml", &config).unwrap();
        validator.validate(&pod, "b.yaml", &config).unwrap();

        let loads = logger.messages(Level::Debug);
        assert_eq!(loads.len(), 1, "schema should be cached: {:?}", loads);
        assert!(loads[0].starts_with("loaded schema"));
        assert_eq!(logger.messages(Level::Trace).len(), 2);
    }

    #[test]
    fn test_schema_path_layout() {
        let config = SchemaConfig::default();
        let path = KubernetesValidator::schema_path(Path::new("/s"), &config, "Deployment", "apps/v1");
        assert_eq!(
            path,
            PathBuf::from("/s/kubernetes-json-schema/master/master-standalone-strict/deployment-apps-v1.json")
        );
        let path = KubernetesValidator::schema_path(
            Path::new("/s"),
            &config.clone().with_strict(false),
            "ClusterRole",
            "rbac.authorization.k8s.io/v1",
        );
        assert!(path.ends_with("master-standalone/clusterrole-rbac-v1.json"));
        let path = KubernetesValidator::schema_path(Path::new("/s"), &config, "Pod", "v1");
        assert!(path.ends_with("pod-v1.json"));
    }

    #[test]
    fn test_missing_kind_has_no_kind() {
        let validator = KubernetesValidator::new();
        let results = validator
            .validate(&document("apiVersion: v1\n"), "f.yaml", &SchemaConfig::default().with_schema_dir("/nonexistent"))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].kind.is_empty());
        assert!(!results[0].is_valid());
    }

    #[test]
    fn test_unknown_schema_is_not_found() {
        let dir = TempDir::new().unwrap();
        let validator = KubernetesValidator::new();
        let config = SchemaConfig::default().with_schema_dir(dir.path());
        let err = validator
            .validate(&document("apiVersion: v1\nkind: Widget\n"), "f.yaml", &config)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_valid_against_bundle() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "pod-v1.json", &pod_schema());
        let validator = KubernetesValidator::new();
        let config = SchemaConfig::default().with_schema_dir(dir.path());
        let results = validator
            .validate(
                &document(
                    "apiVersion: v1\nkind: Pod\nmetadata:\n  name: a\nspec:\n  containers:\n  - name: c\n    ports:\n    - containerPort: 80\n",
                ),
                "f.yaml",
                &config,
            )
            .unwrap();
        assert!(results[0].is_valid(), "{:?}", results[0].errors);
    }

    #[test]
    fn test_field_errors_against_bundle() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "pod-v1.json", &pod_schema());
        let validator = KubernetesValidator::new();
        let config = SchemaConfig::default().with_schema_dir(dir.path());
        let results = validator
            .validate(
                &document("apiVersion: v1\nkind: Pod\nbogus: 1\nspec:\n  hostPID: \"yes\"\n  containers:\n  - name: 5\n"),
                "f.yaml",
                &config,
            )
            .unwrap();
        let rendered: Vec<String> = results[0].errors.iter().map(|e| e.to_string()).collect();
        assert!(rendered.contains(&"(root): Additional property bogus is not allowed".to_string()));
        assert!(rendered.contains(&"spec.hostPID: Invalid type. Expected: boolean, given: string".to_string()));
        assert!(rendered.contains(&"spec.containers.0.name: Invalid type. Expected: string, given: integer".to_string()));
    }

    #[test]
    fn test_structural_checks_without_bundle() {
        let mut errors = Vec::new();
        let value = json!({"kind": "Pod", "metadata": {"name": 3}});
        structural_checks(value.as_object().unwrap(), &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "metadata.name");
    }

    #[test]
    fn test_missing_api_version() {
        let validator = KubernetesValidator::new();
        let results = validator
            .validate(&document("kind: Pod\n"), "f.yaml", &SchemaConfig::default())
            .unwrap();
        assert_eq!(results[0].kind, "Pod");
        assert_eq!(results[0].errors[0].to_string(), "(root): apiVersion is required");
    }
}

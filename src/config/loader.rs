//! Layered YAML loading.
//!
//! Reads `{config_dir}/base/*.yaml` in a fixed order, then
//! `{config_dir}/environments/{env}.yaml`, merges them field-by-field and
//! resolves `${VAR:default}` references in the result.

use super::error::ConfigError;
use super::interpolate::resolve_env_vars_with;
use super::merge::deep_merge;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Variable selecting the active environment.
pub const ENVIRONMENT_VAR: &str = "DP_ENVIRONMENT";

/// Environment used when none is given and `DP_ENVIRONMENT` is unset.
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Base files loaded when the caller does not name any.
pub const DEFAULT_BASE_FILES: [&str; 4] = ["logging.yaml", "kafka.yaml", "spark.yaml", "iceberg.yaml"];

/// Subdirectory holding base layers.
pub const BASE_DIR: &str = "base";

/// Subdirectory holding per-environment layers.
pub const ENVIRONMENTS_DIR: &str = "environments";

/// Kind of layer, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerKind {
    /// A file under `base/`
    Base,
    /// `environments/{env}.yaml` (highest priority)
    Environment,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Base => write!(f, "base"),
            LayerKind::Environment => write!(f, "environment"),
        }
    }
}

/// Inputs of a layered load.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Directory containing `base/` and `environments/`.
    pub config_dir: PathBuf,
    /// Explicit environment name; falls back to `DP_ENVIRONMENT`.
    pub environment: Option<String>,
    /// Explicit base file names; falls back to [`DEFAULT_BASE_FILES`].
    pub base_files: Option<Vec<String>>,
}

impl ConfigSources {
    /// Sources rooted at `config_dir` with default environment and files.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: None,
            base_files: None,
        }
    }

    /// Set the environment name.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the ordered list of base files.
    pub fn with_base_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// The environment name this load will use.
    pub fn effective_environment(&self) -> String {
        self.effective_environment_with(&|name: &str| std::env::var(name).ok())
    }

    fn effective_environment_with<F>(&self, lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.environment
            .clone()
            .filter(|env| !env.is_empty())
            .or_else(|| lookup(ENVIRONMENT_VAR).filter(|env| !env.is_empty()))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// The base file names this load will use, in order.
    pub fn effective_base_files(&self) -> Vec<String> {
        match &self.base_files {
            Some(files) => files.clone(),
            None => DEFAULT_BASE_FILES.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Candidate layer paths, lowest precedence first. Files may not exist.
    pub fn layer_paths(&self) -> Vec<(LayerKind, PathBuf)> {
        self.layer_paths_for(&self.effective_environment())
    }

    fn layer_paths_for(&self, environment: &str) -> Vec<(LayerKind, PathBuf)> {
        let base_dir = self.config_dir.join(BASE_DIR);
        let mut paths: Vec<(LayerKind, PathBuf)> = self
            .effective_base_files()
            .into_iter()
            .map(|name| (LayerKind::Base, base_dir.join(name)))
            .collect();
        paths.push((
            LayerKind::Environment,
            self.config_dir
                .join(ENVIRONMENTS_DIR)
                .join(format!("{environment}.yaml")),
        ));
        paths
    }
}

/// Load, merge and resolve all layers against the process environment.
pub fn load_layered_config(sources: &ConfigSources) -> Result<Value, ConfigError> {
    load_layered_config_with(sources, &|name: &str| std::env::var(name).ok())
}

/// Load, merge and resolve all layers using `lookup` for variables.
pub fn load_layered_config_with<F>(sources: &ConfigSources, lookup: &F) -> Result<Value, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let environment = sources.effective_environment_with(lookup);
    debug!(
        config_dir = %sources.config_dir.display(),
        environment = %environment,
        "Loading layered configuration"
    );

    let mut merged = Value::Object(Map::new());
    for (kind, path) in sources.layer_paths_for(&environment) {
        if !path.exists() {
            trace!(layer = %kind, path = %path.display(), "Layer not found, skipping");
            continue;
        }
        let document = read_yaml_document(&path)?;
        debug!(layer = %kind, path = %path.display(), "Merging layer");
        merged = deep_merge(merged, document);
    }

    Ok(resolve_env_vars_with(merged, lookup))
}

/// Parse one YAML file into a mapping.
///
/// An empty or comment-only file yields an empty mapping. `<<` merge keys
/// are expanded before conversion.
pub fn read_yaml_document(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_yaml_document(&content).map_err(|err| match err {
        DocumentError::Yaml(source) => ConfigError::parse(path, source),
        DocumentError::NotAMapping => ConfigError::NotAMapping {
            path: path.to_path_buf(),
        },
    })
}

enum DocumentError {
    Yaml(serde_yaml::Error),
    NotAMapping,
}

fn parse_yaml_document(content: &str) -> Result<Value, DocumentError> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(DocumentError::Yaml)?;
    document.apply_merge().map_err(DocumentError::Yaml)?;
    match serde_yaml::from_value::<Value>(document).map_err(DocumentError::Yaml)? {
        Value::Null => Ok(Value::Object(Map::new())),
        mapping @ Value::Object(_) => Ok(mapping),
        _ => Err(DocumentError::NotAMapping),
    }
}

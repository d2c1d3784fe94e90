//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, resolving or binding configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An existing config file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid YAML.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config file's top level is a scalar or a sequence.
    #[error("config file '{path}' must contain a mapping at the top level")]
    NotAMapping { path: PathBuf },

    /// The resolved mapping does not fit the typed settings.
    #[error("failed to bind settings: {0}")]
    Bind(#[from] serde_json::Error),

    /// An override variable holds a value its field cannot take.
    #[error("invalid value '{value}' for environment variable '{var}': {reason}")]
    InvalidEnvValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a YAML parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid override error.
    pub fn invalid_env_value(
        var: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEnvValue {
            var: var.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_env_value_display() {
        let err = ConfigError::invalid_env_value("DP_DB_PORT", "abc", "expected an integer");
        assert_eq!(
            err.to_string(),
            "invalid value 'abc' for environment variable 'DP_DB_PORT': expected an integer"
        );
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let yaml_err = serde_yaml::from_str::<serde_json::Value>("a: [1, 2").unwrap_err();
        let err = ConfigError::parse("/etc/dp/base/kafka.yaml", yaml_err);
        assert!(err.to_string().starts_with("failed to parse config file '/etc/dp/base/kafka.yaml'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

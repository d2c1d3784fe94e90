//! Platform error hierarchy.
//!
//! One error type with a [`ErrorKind`] discriminant, a human message, a
//! sorted map of structured details and an optional cause.

use crate::config::ConfigError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Longest validation value kept in details.
const MAX_VALUE_LEN: usize = 100;

/// Error kinds for programmatic handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad or missing configuration.
    Configuration,
    /// An external service could not be reached.
    Connection,
    /// Input failed validation.
    Validation,
    /// A schema is missing, incompatible or malformed.
    Schema,
    /// A data quality check failed.
    DataQuality,
    /// A transient failure worth retrying.
    Retryable,
    /// Anything else.
    Internal,
}

/// Structured platform error.
#[derive(Debug, Serialize)]
pub struct PlatformError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
    #[serde(skip)]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl PlatformError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: BTreeMap::new(),
            source: None,
        }
    }

    /// Add a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Retryable
    }

    // Convenience constructors

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn connection(message: impl Into<String>, service: &str) -> Self {
        Self::new(ErrorKind::Connection, message).with_detail("service", service)
    }

    pub fn with_host(self, host: &str) -> Self {
        self.with_detail("host", host)
    }

    pub fn with_port(self, port: u16) -> Self {
        self.with_detail("port", port)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn with_field(self, field: &str) -> Self {
        self.with_detail("field", field)
    }

    /// Record the offending value, truncated to 100 characters.
    pub fn with_value(self, value: impl fmt::Display) -> Self {
        let value: String = value.to_string().chars().take(MAX_VALUE_LEN).collect();
        self.with_detail("value", value)
    }

    pub fn with_constraint(self, constraint: &str) -> Self {
        self.with_detail("constraint", constraint)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn with_schema_name(self, name: &str) -> Self {
        self.with_detail("schema_name", name)
    }

    pub fn with_schema_version(self, version: &str) -> Self {
        self.with_detail("schema_version", version)
    }

    pub fn data_quality(message: impl Into<String>, check_name: &str) -> Self {
        Self::new(ErrorKind::DataQuality, message).with_detail("check_name", check_name)
    }

    pub fn with_table(self, table: &str) -> Self {
        self.with_detail("table", table)
    }

    pub fn with_column(self, column: &str) -> Self {
        self.with_detail("column", column)
    }

    pub fn with_expected(self, expected: impl fmt::Display) -> Self {
        self.with_detail("expected", expected)
    }

    pub fn with_actual(self, actual: impl fmt::Display) -> Self {
        self.with_detail("actual", actual)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retryable, message)
    }

    pub fn with_retry_after(self, seconds: u64) -> Self {
        self.with_detail("retry_after_seconds", seconds)
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        self.with_detail("max_retries", max_retries)
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, err.to_string())
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.details.is_empty() {
            let details: Vec<String> = self
                .details
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            write!(f, " | Details: {{{}}}", details.join(", "))?;
        }
        if let Some(source) = &self.source {
            write!(f, " | Caused by: {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ConfigError> for PlatformError {
    fn from(err: ConfigError) -> Self {
        PlatformError::configuration("Failed to load configuration").with_source(err)
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for PlatformError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<PlatformError>() {
            Ok(platform_err) => platform_err,
            Err(err) => PlatformError::internal(format!("{err:#}")),
        }
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

//! Structured logging setup.
//!
//! JSON lines for production, human-readable console output for
//! development. Every event emitted inside [`service_span`] carries the
//! `service` and `environment` fields.

use crate::config::{ENVIRONMENT_VAR, PlatformSettings};
use anyhow::{Result, bail};
use std::io::IsTerminal;
use tracing::{Level, Span, Subscriber};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

/// Variable naming the service in log context.
pub const SERVICE_NAME_VAR: &str = "DP_SERVICE_NAME";

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// trace, debug, info, warn(ing), error or critical.
    pub level: String,
    /// Emit JSON lines instead of console output.
    pub json: bool,
    /// Service name; falls back to `DP_SERVICE_NAME`, then `unknown`.
    pub service_name: Option<String>,
    /// Environment; falls back to `DP_ENVIRONMENT`, then `local`.
    pub environment: Option<String>,
    pub output: LogOutput,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            service_name: None,
            environment: None,
            output: LogOutput::Stdout,
        }
    }
}

impl LogOptions {
    /// Options for `service_name`, JSON when `DP_ENVIRONMENT` is production.
    pub fn for_service(service_name: impl Into<String>) -> Self {
        let is_prod = std::env::var(ENVIRONMENT_VAR)
            .map(|e| e == "prod" || e == "production")
            .unwrap_or(false);
        Self {
            json: is_prod,
            service_name: Some(service_name.into()),
            ..Self::default()
        }
    }

    /// Options taken from the `logging` settings group. Production forces JSON.
    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self {
            level: settings.logging.level.clone(),
            json: settings.logging.json || settings.is_production(),
            service_name: settings.logging.service_name.clone(),
            environment: Some(settings.environment.clone()),
            output: LogOutput::Stdout,
        }
    }

    /// Write to `output` instead.
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// The service name recorded on every event.
    pub fn service(&self) -> String {
        self.service_with(&|name: &str| std::env::var(name).ok())
    }

    fn service_with<F>(&self, lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.service_name
            .clone()
            .or_else(|| lookup(SERVICE_NAME_VAR))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// The environment recorded on every event.
    pub fn environment(&self) -> String {
        self.environment_with(&|name: &str| std::env::var(name).ok())
    }

    fn environment_with<F>(&self, lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.environment
            .clone()
            .or_else(|| lookup(ENVIRONMENT_VAR))
            .unwrap_or_else(|| "local".to_string())
    }
}

/// Parse a level name, case-insensitively. `critical` maps to ERROR.
pub fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "critical" => Ok(Level::ERROR),
        _ => bail!("Invalid log level: {level}"),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` directives are honored on top of `options.level`. Fails if a
/// global subscriber is already installed.
pub fn configure_logging(options: &LogOptions) -> Result<()> {
    let (writer, is_terminal) = match options.output {
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), std::io::stdout().is_terminal()),
        LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), std::io::stderr().is_terminal()),
    };
    build_subscriber(options, writer, is_terminal)?.try_init()?;

    tracing::debug!(
        level = %options.level,
        json = options.json,
        "Logging initialized"
    );
    Ok(())
}

/// The subscriber [`configure_logging`] installs, writing to `writer`.
fn build_subscriber(
    options: &LogOptions,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Result<Box<dyn Subscriber + Send + Sync>> {
    let level = parse_level(&options.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    if options.json {
        let layer = fmt::layer()
            .json()
            .with_writer(writer)
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true);
        Ok(Box::new(registry.with(layer)))
    } else {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        Ok(Box::new(registry.with(layer)))
    }
}

/// Install logging for `service_name` with default options.
pub fn init_default(service_name: &str) -> Result<()> {
    configure_logging(&LogOptions::for_service(service_name))
}

/// Span carrying the service context; enter it for the lifetime of the process.
pub fn service_span(options: &LogOptions) -> Span {
    tracing::info_span!(
        "service",
        service = %options.service(),
        environment = %options.environment()
    )
}

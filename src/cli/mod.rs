//! CLI command definitions for dp-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Inspect layered data platform configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory containing base/ and environments/
    /// (default: $DP_CONFIG_DIR, then ./config)
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Environment name (default: $DP_ENVIRONMENT, then "local")
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective settings (default if no subcommand given)
    Show(ShowArgs),

    /// Print one value of the resolved configuration by dotted path
    Get(GetArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Show(ShowArgs::default())
    }
}

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Print the resolved YAML mapping instead of the typed settings
    #[arg(long)]
    pub raw: bool,

    /// Print credentials instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Dotted path, e.g. kafka.bootstrap_servers
    pub key: String,

    /// Output format for mappings and sequences
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Look a dotted path up in a mapping. Numeric segments index sequences.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Render a value for printing. Strings print bare.
pub fn render(value: &Value, format: OutputFormat) -> anyhow::Result<String> {
    if let Value::String(s) = value {
        return Ok(s.clone());
    }
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    };
    Ok(rendered.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::parse_from([
            "dp-config",
            "--config-dir",
            "/etc/dp",
            "--env",
            "prod",
            "get",
            "kafka.acks",
        ]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/etc/dp")));
        assert_eq!(cli.env.as_deref(), Some("prod"));
        match cli.command {
            Some(Command::Get(args)) => assert_eq!(args.key, "kafka.acks"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_show_is_optional() {
        let cli = Cli::parse_from(["dp-config"]);
        assert!(cli.command.is_none());
        assert!(matches!(Command::default(), Command::Show(ShowArgs { raw: false, .. })));

        let cli = Cli::parse_from(["dp-config", "show", "--format", "json", "--raw"]);
        match cli.command {
            Some(Command::Show(args)) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_path() {
        let value = json!({
            "kafka": {"bootstrap_servers": "localhost:9092"},
            "topics": ["orders", "payments"]
        });
        assert_eq!(
            lookup_path(&value, "kafka.bootstrap_servers"),
            Some(&json!("localhost:9092"))
        );
        assert_eq!(lookup_path(&value, "topics.1"), Some(&json!("payments")));
        assert_eq!(lookup_path(&value, "kafka"), Some(&json!({"bootstrap_servers": "localhost:9092"})));
        assert!(lookup_path(&value, "kafka.missing").is_none());
        assert!(lookup_path(&value, "topics.9").is_none());
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("plain"), OutputFormat::Json).unwrap(), "plain");
        assert_eq!(render(&json!(5432), OutputFormat::Yaml).unwrap(), "5432");
        assert_eq!(
            render(&json!({"a": 1}), OutputFormat::Json).unwrap(),
            "{\n  \"a\": 1\n}"
        );
        assert_eq!(render(&json!({"a": 1}), OutputFormat::Yaml).unwrap(), "a: 1");
    }
}

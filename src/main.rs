//! dp-config
//!
//! Prints the configuration a data platform service would see: layered
//! YAML, `${VAR:default}` interpolation and `DP_*` overrides applied.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dp_common::cli::{Cli, Command, GetArgs, ShowArgs, lookup_path, render};
use dp_common::config::{ConfigDiscovery, ConfigSources, SettingsHolder, load_layered_config};
use dp_common::logging::{LogOptions, LogOutput, configure_logging, service_span};
use serde_json::Value;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let log_options = LogOptions {
        level: if cli.verbose { "debug" } else { "warn" }.to_string(),
        json: cli.json_logs,
        service_name: Some("dp-config".to_string()),
        environment: cli.env.clone(),
        output: LogOutput::Stderr,
    };
    configure_logging(&log_options)?;
    let span = service_span(&log_options);
    let _entered = span.enter();

    let mut discovery = ConfigDiscovery::new();
    if let Some(dir) = &cli.config_dir {
        discovery = discovery.with_config_dir(dir);
    }
    if let Some(env) = &cli.env {
        discovery = discovery.with_environment(env);
    }
    let holder = SettingsHolder::new(discovery);

    match cli.command.unwrap_or_default() {
        Command::Show(args) => show(&holder, &args),
        Command::Get(args) => get(&holder, &args),
    }
}

fn show(holder: &SettingsHolder, args: &ShowArgs) -> Result<()> {
    let value = if args.raw {
        resolved_config(holder)?
    } else {
        let settings = holder.get()?;
        info!(environment = %settings.environment, "Printing effective settings");
        if args.show_secrets {
            serde_json::to_value(&*settings)?
        } else {
            serde_json::to_value(settings.redacted())?
        }
    };
    println!("{}", render(&value, args.format)?);
    Ok(())
}

fn get(holder: &SettingsHolder, args: &GetArgs) -> Result<()> {
    let resolved = resolved_config(holder)?;
    let value = lookup_path(&resolved, &args.key)
        .with_context(|| format!("Key not found: {}", args.key))?;
    println!("{}", render(value, args.format)?);
    Ok(())
}

/// The merged and interpolated YAML mapping, before typed binding.
fn resolved_config(holder: &SettingsHolder) -> Result<Value> {
    let discovery = holder.discovery();
    let Some(dir) = discovery.resolve_dir() else {
        bail!("No configuration directory found; pass --config-dir or set DP_CONFIG_DIR");
    };
    let mut sources = ConfigSources::new(&dir);
    if let Some(env) = &discovery.environment {
        sources = sources.with_environment(env);
    }
    debug!(path = %dir.display(), environment = %sources.effective_environment(), "Resolving configuration");
    Ok(load_layered_config(&sources)?)
}

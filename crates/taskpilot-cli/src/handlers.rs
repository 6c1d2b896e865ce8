//! Command handlers for CLI operations

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use serde_json::json;
use taskpilot_agent::{Pipeline, RunOptions, fatal_report};
use taskpilot_core::PilotConfig;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::cli::{ConfigArgs, RunArgs};

/// Crates whose logs the verbosity flag controls
const LOG_TARGETS: &[&str] = &[
    "taskpilot_agent",
    "taskpilot_context",
    "taskpilot_core",
    "taskpilot_providers",
    "taskpilot",
];

/// Exit status for a run where some phases failed
const PARTIAL_FAILURE: u8 = 2;

/// Install the tracing subscriber. `RUST_LOG` overrides the verbosity flag.
///
/// # Errors
/// Returns an error if the log file cannot be opened.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let directives = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| directives.into());

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true),
            )
            .init();
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr).with_target(false))
            .init();
    }

    Ok(())
}

/// Loads the explicit config file, else the default one if present, else defaults.
fn load_config(path: Option<&Path>) -> Result<PilotConfig> {
    if let Some(path) = path {
        return PilotConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match PilotConfig::config_path() {
        Ok(default_path) if default_path.exists() => PilotConfig::load_from_file(&default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display())),
        _ => Ok(PilotConfig::default()),
    }
}

/// Handle `taskpilot run`
///
/// # Errors
/// Returns an error for fatal pipeline failures; nothing was executed in that case.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_run(args: RunArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    if args.no_fallback {
        config.planning.allow_fallback = false;
    }
    // Either the config or the flag can turn execution on.
    let dry_run = config.execution.dry_run && !args.execute;

    let pipeline = Pipeline::from_config(&config, args.offline)
        .context("Failed to set up the planner")?;
    tracing::info!(
        "Running with {} planner (dry_run={dry_run})",
        pipeline.planner_name()
    );

    let options = RunOptions {
        dry_run,
        project_root: args.project,
    };

    match pipeline.run(&args.instruction, &options).await {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.final_output.trim_end());
            }
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(PARTIAL_FAILURE)
            })
        }
        Err(err) => {
            if args.json {
                let payload = json!({
                    "success": false,
                    "fatal": true,
                    "error": err.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            Err(anyhow!(fatal_report(&err)))
        }
    }
}

/// Handle `taskpilot config`
///
/// # Errors
/// Returns an error if the configuration cannot be read or written.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub fn handle_config(args: &ConfigArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => PilotConfig::config_path()?,
    };

    if args.init {
        if path.exists() {
            println!("Configuration already exists at {}", path.display());
        } else {
            PilotConfig::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    let (config, source) = if path.exists() {
        (load_config(Some(&path))?, path.display().to_string())
    } else {
        (PilotConfig::default(), "built-in defaults".to_owned())
    };

    let key_status = if config.provider.resolve_api_key().is_some() {
        "set"
    } else {
        "not set"
    };

    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some("********".to_owned());
    }

    println!("# Effective configuration ({source})");
    println!(
        "# API key: {key_status} (config or {})",
        config.provider.kind.env_var()
    );
    println!(
        "{}",
        toml::to_string_pretty(&shown).context("Failed to render configuration")?
    );

    Ok(ExitCode::SUCCESS)
}

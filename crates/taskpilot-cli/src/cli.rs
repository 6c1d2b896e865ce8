use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Command-line arguments for taskpilot
#[derive(Parser, Debug)]
#[command(
    name = "taskpilot",
    version,
    about = "Run natural-language tasks against a project: interpret, plan, execute, report"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Configuration file (default: ~/.taskpilot/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interpret and run an instruction
    Run(RunArgs),
    /// Show the effective configuration, or write the default file
    Config(ConfigArgs),
}

/// Arguments for `taskpilot run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Instruction, e.g. "organize src/ with goal to improve maintainability"
    pub instruction: String,

    /// Project root the task target is resolved against
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Apply filesystem changes instead of a dry run
    #[arg(long)]
    pub execute: bool,

    /// Plan with the rule-based planner; no network access
    #[arg(long)]
    pub offline: bool,

    /// Fail instead of substituting the default plan
    #[arg(long)]
    pub no_fallback: bool,

    /// Print the execution result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `taskpilot config`
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration file if it does not exist
    #[arg(long)]
    pub init: bool,
}

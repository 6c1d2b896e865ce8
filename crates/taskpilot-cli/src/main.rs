//! taskpilot - natural-language task pipeline command-line interface

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Command};

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    handlers::init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::Run(args) => handlers::handle_run(args, cli.config.as_deref()).await,
        Command::Config(args) => handlers::handle_config(&args, cli.config.as_deref()),
    }
}

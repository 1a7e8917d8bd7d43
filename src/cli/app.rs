//! Main CLI application structure

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::session::Session;
use crate::engine::TaskEngine;
use crate::storage::{Config, FileStore, TaskPersistence};

#[derive(Parser)]
#[command(name = "procrastinate")]
#[command(author, version, about = "Natural-language todo list for the terminal")]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f')]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Directory holding config.toml and, by default, the task file
    #[arg(long, env = "PROCRASTINATE_HOME")]
    pub home: Option<PathBuf>,

    /// A single command to run, e.g. `add buy milk due tomorrow 5pm`.
    /// Without one, commands are read from stdin.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub input: Vec<String>,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.home.as_deref())?;
    let format = cli
        .format
        .unwrap_or_else(|| config.settings.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose(&format!("Config: {}", config.config_path().display()));
    output.verbose(&format!("Tasks: {}", config.task_file().display()));

    let case_sensitive = config.settings.case_sensitive_search;
    let engine = TaskEngine::new(FileStore::from_config(config))?
        .with_case_sensitive_search(case_sensitive);
    let mut session = Session::new(engine);

    if cli.input.is_empty() {
        interactive(&mut session, &output)?;
    } else {
        let feedback = session.execute(&cli.input.join(" "))?;
        output.feedback(&feedback);
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Reads commands from stdin until `exit` or end of input
fn interactive<S: TaskPersistence>(session: &mut Session<S>, output: &Output) -> Result<()> {
    output.view(session.view());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        output.prompt();
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let feedback = session.execute(&line)?;
        output.feedback(&feedback);
        if feedback.exit {
            break;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for JSON output
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

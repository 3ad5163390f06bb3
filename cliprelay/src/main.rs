//! Clipboard relay between a git repository and a desktop chat UI.
//!
//! Reads `config.yaml` (or `--config`), then runs its action loop forever.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use cliprelay::interpreter::RunStop;
use cliprelay::io::config::DEFAULT_CONFIG_PATH;
use cliprelay::io::init::{InitOptions, init_config};
use cliprelay::logging;
use cliprelay::start::prepare;
use cliprelay::validate::validate_config;

#[derive(Parser)]
#[command(
    name = "cliprelay",
    version,
    about = "Relay files between a git repository and a desktop UI via the clipboard"
)]
struct Cli {
    /// Configuration file (YAML, or TOML by `.toml` extension).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the action loop until the process is killed.
    Run,
    /// Check the configuration and print the resolved action plan.
    Validate,
    /// Write a commented starter configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run(&cli.config),
        Command::Validate => cmd_validate(&cli.config),
        Command::Init { force } => init_config(&cli.config, &InitOptions { force }),
    }
}

fn cmd_run(config: &Path) -> Result<()> {
    let mut interpreter = prepare(config)?;
    match interpreter.run()? {
        RunStop::Cancelled { cycles_completed } | RunStop::CycleLimit { cycles_completed } => {
            info!(cycles_completed, "relay stopped");
        }
    }
    Ok(())
}

fn cmd_validate(config: &Path) -> Result<()> {
    let outcome = validate_config(config)?;
    print!("{}", outcome.render());
    Ok(())
}

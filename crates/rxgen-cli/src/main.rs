//! rxgen CLI - Command-line interface for the rxgen observable event generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Observable event wrapper generator for C#
#[derive(Parser)]
#[command(name = "rxgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (rxgen.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output format options.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl OutputFormat {
    /// Serialize `value` in the JSON flavour of this format.
    pub fn json<T: serde::Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::JsonCompact => serde_json::to_string(value)?,
            _ => serde_json::to_string_pretty(value)?,
        })
    }
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate wrapper sources for a program model
    Generate(commands::generate::GenerateArgs),
    /// Show the requested types and the events they expose
    Inspect(commands::inspect::InspectArgs),
    /// Check that a program model can be generated from
    Validate(commands::validate::ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rxgen={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = config::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, config, cli.format, cli.quiet),
        Commands::Inspect(args) => commands::inspect::execute(args, config, cli.format),
        Commands::Validate(args) => commands::validate::execute(args, config, cli.format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

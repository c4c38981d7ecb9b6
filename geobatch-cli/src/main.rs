//! geobatch CLI - Command-line interface
//!
//! Geocodes the address column of a CSV sheet and writes the sheet back
//! with latitude, longitude, formatted address and status columns.

mod commands;
mod error;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;

use commands::common::ProviderArg;
use commands::config::ConfigCommands;
use commands::run::RunArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "geobatch", version, about = "Batch geocoding for address spreadsheets")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Geocode every row of a CSV file
    Run {
        /// Input CSV file (first row is the header)
        input: PathBuf,

        /// Output file (.csv or .json) [default: addresses_with_coordinates.csv next to input]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Address column [default: detected from the header]
        #[arg(short, long)]
        column: Option<String>,

        /// Geocoding provider [default: providers.default, else first configured]
        #[arg(short, long, value_enum)]
        provider: Option<ProviderArg>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Geocode a single address
    Lookup {
        /// Address to geocode
        address: String,

        /// Geocoding provider
        #[arg(short, long, value_enum)]
        provider: Option<ProviderArg>,

        /// Print the raw outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List providers and their configuration status
    Providers,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create or update the configuration file interactively
    Init,
}

fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = match geobatch::logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => return report(CliError::Logging(e.to_string())),
    };
    debug!(version = geobatch::VERSION, "Starting geobatch");

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            input,
            output,
            column,
            provider,
            no_progress,
        } => block_on(commands::run::run(RunArgs {
            input,
            output,
            column,
            provider,
            no_progress,
        })),
        Commands::Lookup {
            address,
            provider,
            json,
        } => block_on(commands::lookup::run(&address, provider, json)),
        Commands::Providers => commands::providers::run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Init => commands::init::run(),
    }
}

/// Runs an async command on a fresh multi-threaded runtime.
fn block_on<F>(future: F) -> Result<(), CliError>
where
    F: std::future::Future<Output = Result<(), CliError>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config(format!("Failed to create Tokio runtime: {}", e)))?;
    runtime.block_on(future)
}

fn report(error: CliError) -> ExitCode {
    eprintln!("Error: {}", error);
    ExitCode::from(error.exit_code() as u8)
}

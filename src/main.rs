//! Sequencer deploy CLI entrypoint.
//!
//! This is the main entrypoint for the sequencer-deploy command-line tool.

use std::process::ExitCode;

use sequencer_deploy::cli::{Cli, OutputFormat, OutputFormatter};
use sequencer_deploy::config::ConfigParser;
use sequencer_deploy::error::{DeployError, Result};
use sequencer_deploy::generator::Generator;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Environment variables from .env feed clap's env fallbacks.
    let dotenv = match ConfigParser::new().load_dotenv() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.output);
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", OutputFormatter::new(cli.output).error(&format!("Error: {e}")));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool, format: OutputFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        OutputFormat::Json => subscriber.json().init(),
        OutputFormat::Text => subscriber.init(),
    }
}

/// Validates arguments, then generates the manifest tree.
fn run(cli: &Cli) -> Result<()> {
    cli.validate().map_err(DeployError::from)?;
    debug!("Arguments validated");

    let formatter = OutputFormatter::new(cli.output);
    let report = Generator::new().generate(&cli.generate_options())?;

    eprintln!("{}", formatter.format_report(&report));
    Ok(())
}

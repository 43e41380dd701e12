//! school-core CLI
//!
//! Commands:
//! - `search` / `suggest` / `facets` - query a JSON array of records
//! - `grade` / `risk` / `report` - grading helpers

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use school_core::cli::{Cli, Commands};
use school_core::config::EngineConfig;
use school_core::error::AppError;
use school_core::tools;

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags; RUST_LOG wins when set
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let Some(command) = cli.command else {
        return Err(AppError::InvalidInput(
            "No command specified. Use --help for usage information.".to_string(),
        )
        .into());
    };
    let config_path = cli.config.as_deref();

    // Only commands that read defaults touch the config file
    let output = match command {
        Commands::Search(args) => tools::search::execute_search(args, &load_config(config_path)?)?,
        Commands::Suggest(args) => {
            tools::search::execute_suggest(args, &load_config(config_path)?)?
        }
        Commands::Facets(args) => tools::search::execute_facets(args, &load_config(config_path)?)?,
        Commands::Grade(args) => tools::grade::execute_grade(args, &load_config(config_path)?)?,
        Commands::Risk(args) => tools::grade::execute_risk(args)?,
        Commands::Report(args) => tools::grade::execute_report(args, &load_config(config_path)?)?,
    };
    Ok(output)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config =
        EngineConfig::load(path).map_err(|e| AppError::Config(format!("{:#}", e)))?;
    debug!("Using config: {:?}", config);
    Ok(config)
}

/// Exit code for a failed command; anything that is not an `AppError` is 5
fn get_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<AppError>()
        .map_or(5, AppError::exit_code)
}

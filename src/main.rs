mod aggregator;
mod classifier;
mod cli;
mod error;
mod export;
mod fmt;
mod loader;
mod models;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};
use error::CuadreError;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "cuadre=info",
        _ => "cuadre=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Report { file, run, details } => cli::report::run(&file, &run, details),
        Commands::Export {
            file,
            run,
            output,
            name,
            upload_to,
        } => cli::export::run(&file, &run, output, name, upload_to),
        Commands::Classify {
            description,
            type_hint,
            cash,
            transfer,
            run,
        } => cli::classify::run(&description, type_hint, cash, transfer, &run),
        Commands::Config { command } => match command {
            ConfigCommands::Show { config } => cli::config::show(config.as_deref()),
            ConfigCommands::Init { config, force } => cli::config::init(config.as_deref(), force),
            ConfigCommands::Path => cli::config::path(),
        },
    };

    match result {
        Ok(()) => {}
        Err(CuadreError::NoUsableData(source)) => {
            eprintln!("No data found in {source}: every sheet was skipped or every row was filtered out.");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

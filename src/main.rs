mod cli;
mod diagnostics;
mod error;
mod fmt;
mod importer;
mod models;
mod query;
mod reports;
mod settings;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    if verbose {
        builder.parse_filters("debug");
    } else if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder.parse_filters(&settings::load_settings().log_level);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Import {
            file,
            search,
            sort,
            asc,
            limit,
        } => cli::import::run(&file, search.as_deref(), sort, asc, limit),
        Commands::Summary { file, top } => cli::summary::run(&file, top),
        Commands::Export {
            file,
            output,
            format,
        } => cli::export::run(&file, output, format),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

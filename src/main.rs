mod cli;
mod codes;
mod error;
mod grouper;
mod importer;
mod logging;
mod matcher;
mod models;
mod money;
mod reconciler;
mod settings;
mod sink;
mod tax_check;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Uchrabvr {
            config,
            input,
            output,
            yes,
        } => cli::uchrabvr::run(config, input, output, yes),
        Commands::Uder { config, input } => cli::uder::run(config, input),
        Commands::Codes { config } => cli::codes::list(config),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

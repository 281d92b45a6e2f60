//! cutgraph CLI: the `cutgraph` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Types { json } => commands::types::run(json),

        Commands::Check {
            config,
            setup,
            json,
        } => commands::check::run(config, setup, json),

        Commands::Run {
            config,
            cut,
            entries,
            setup,
            json,
        } => commands::run::run(commands::run::Args {
            config,
            cut,
            entries,
            setup,
            json,
        }),
    }
}

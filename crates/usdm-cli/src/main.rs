//! usdm-check CLI: the `usdm-check` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            input,
            profile,
            json,
            json_output,
        } => commands::validate::run(input, profile, json, json_output),

        Commands::Order {
            input,
            collection,
            profile,
            json,
        } => commands::order::run(input, collection, profile, json),

        Commands::Criteria {
            input,
            profile,
            json,
        } => commands::criteria::run(input, profile, json),
    }
}

pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(
    name = "shopfront",
    about = "Shopfront catalog operator CLI",
    long_about = "Seed the demo catalog, run product searches, inspect configuration, and check readiness.",
    after_help = "Examples:\n  shopfront seed\n  shopfront search --category 2 --max-price 30\n  shopfront doctor"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply the catalog schema and load the demo catalog if the store is empty")]
    Seed,
    #[command(about = "Search products; every given filter must match")]
    Search(SearchArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, admin token readiness, and DB connectivity")]
    Doctor,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Seed => commands::seed::run(),
        Command::Search(args) => commands::search::run(&args),
        Command::Config => commands::config::run(),
        Command::Doctor => commands::doctor::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

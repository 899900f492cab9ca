//! smt CLI - compact trees and the recipe that builds them

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use small_memory_tree::resolver::ResolveError;
use small_memory_tree::util::diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        // Resolution failures carry enough structure for a full diagnostic
        match e.downcast_ref::<ResolveError>() {
            Some(resolve_error) => diagnostic::emit(&resolve_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("small_memory_tree=debug")
    } else {
        EnvFilter::new("small_memory_tree=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Show(args) => commands::show::execute(args),
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::History(args) => commands::history::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Deps(args) => commands::deps::execute(args),
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::PackageId(args) => commands::package_id::execute(args),
        Commands::Encode(args) => commands::encode::execute(args),
        Commands::Children(args) => commands::children::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

//! Haulboard - daily transport planning board
//!
//! A CLI for assigning consignments to lorries across a primary run and a
//! reload run, with live capacity and overflow checks.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        eprintln!("  hint: {}", e.hint());
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins, otherwise warn (debug with --verbose)
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

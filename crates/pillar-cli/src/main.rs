//! Pillar CLI - bootstrap curves from configuration files.
//!
//! # Usage
//!
//! ```bash
//! # Check a configuration file
//! pillar validate --config curves.toml
//!
//! # Build every curve and print its nodes
//! pillar bootstrap --config curves.toml
//!
//! # Build one curve and show how each node was found
//! pillar bootstrap --config curves.toml --curve OIS --report
//!
//! # Read a built curve
//! pillar query --config curves.toml --curve OIS --dates 2026-01-02,2030-01-02
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level set by `-v`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = cli.format;

    match cli.command {
        Commands::Bootstrap(args) => commands::bootstrap::execute(&args, format, cli.quiet)?,
        Commands::Query(args) => commands::query::execute(&args, format)?,
        Commands::Validate(args) => commands::validate::execute(&args, cli.quiet)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

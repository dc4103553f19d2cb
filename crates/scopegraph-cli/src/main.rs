// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scopegraph command-line interface.
//!
//! This is the main entry point for the `scopegraph` command.

use clap::{ArgAction, Parser, Subcommand};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod diagnostic;

/// Scopegraph: scope trees and name binding for object-oriented syntax trees
#[derive(Debug, Parser)]
#[command(name = "scopegraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: info, -vv: debug, -vvv+: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve every reference in a set of JSON-encoded translation units
    Resolve(commands::resolve::ResolveArgs),
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Command::Resolve(args) => commands::resolve::run(args),
    };

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are the crates' Rust module paths.
    match v {
        0 => "scopegraph=warn,scopegraph_core=warn",
        1 => "scopegraph=info,scopegraph_core=info",
        2 => "scopegraph=debug,scopegraph_core=debug",
        _ => "scopegraph=trace,scopegraph_core=trace",
    }
}

//! Weld CLI - widget resolution proxy.
//!
//! Provides commands for:
//! - `serve`: Start the resolution server
//! - `resolve`: Resolve an HTML or JSON document from a file or stdin

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ResolveArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Weld - widget resolution proxy.
#[derive(Parser)]
#[command(name = "weld", version, about)]
struct Cli {
    /// Enable verbose output (resolution errors and timing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the resolution server.
    Serve(ServeArgs),
    /// Resolve a document once and print the result.
    Resolve(ResolveArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Serve(args) => rt.block_on(args.execute(output, cli.verbose)),
        Commands::Resolve(args) => rt.block_on(args.execute(output, cli.verbose)),
    }
}

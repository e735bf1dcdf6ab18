//! plantmark CLI - PlantUML blocks in markdown.
//!
//! Provides commands for:
//! - `render`: Convert markdown to HTML with diagrams rendered by the server
//! - `encode`: Print the URL token (or full URL) for a diagram source

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{EncodeArgs, RenderArgs};
use output::Output;

/// plantmark - PlantUML blocks in markdown.
#[derive(Parser)]
#[command(name = "plantmark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown document to HTML.
    Render(RenderArgs),
    /// Encode diagram source for the diagram server.
    Encode(EncodeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Encode(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&err);
        std::process::exit(1);
    }
}

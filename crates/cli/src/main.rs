//! Wellspring CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the chat web server
//! - `ask`    — Ask a single question from the terminal
//! - `doctor` — Check configuration and backend connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "wellspring",
    about = "Wellspring — retrieval-grounded chat over your document library",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "wellspring.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat web server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the grounded answer
    Ask {
        /// The question to ask
        question: String,

        /// Model to use (defaults to mixtral-8x7b)
        #[arg(short, long)]
        model: Option<String>,

        /// Category filter ("ALL" = unfiltered)
        #[arg(long, default_value = "ALL")]
        category: String,
    },

    /// Check configuration and backend connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(&cli.config, port).await,
        Commands::Ask {
            question,
            model,
            category,
        } => commands::ask::run(&cli.config, &question, model.as_deref(), &category).await,
        Commands::Doctor => commands::doctor::run(&cli.config).await,
    }
}

//! filemap CLI
//!
//! Developer tool for inspecting how task targets normalize.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// filemap - normalize task file specifications
#[derive(Parser)]
#[command(name = "filemap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "filemap.yaml", env = "FILEMAP_CONFIG")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all task:target pairs
    Targets,

    /// Print the normalized entries of one target as JSON
    Normalize {
        /// Target reference in `task:target` form
        target: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Normalize every target and report entry counts
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Targets => {
            commands::targets::run(&cli.config)?;
        }
        Commands::Normalize { target, pretty } => {
            commands::normalize::run(&cli.config, &target, pretty)?;
        }
        Commands::Validate => {
            commands::validate::run(&cli.config)?;
        }
    }

    Ok(())
}

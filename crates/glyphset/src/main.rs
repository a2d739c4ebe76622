//! glyphset CLI - prepare labeled glyph images for classifier training.
//!
//! Takes a flat directory of images whose filenames start with their label
//! (`5_1234.png`) and produces `dest/<label>/<label>_<index>.png`, every image
//! resized to 24×24 and contrast-stretched.
//!
//! # Usage
//!
//! ```bash
//! # Run the whole pipeline
//! glyphset prepare ./mnist_images ./mnist_prepared
//!
//! # Show what would happen without writing anything
//! glyphset prepare ./mnist_images ./mnist_prepared --dry-run
//!
//! # Run a single stage
//! glyphset normalize ./raw ./out
//! glyphset bucketize ./out
//! glyphset renumber ./out
//!
//! # Check a prepared tree
//! glyphset inspect ./mnist_prepared
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// glyphset - normalize, bucket and renumber labeled glyph images.
#[derive(Parser, Debug)]
#[command(name = "glyphset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "GLYPHSET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize, bucketize and renumber in one go
    Prepare(cli::prepare::PrepareArgs),

    /// Resize and contrast-stretch images into a flat directory
    Normalize(cli::stages::NormalizeArgs),

    /// Move files into per-label subdirectories
    Bucketize(cli::stages::BucketizeArgs),

    /// Renumber files to <label>_<index> within each directory
    Renumber(cli::stages::RenumberArgs),

    /// Report per-label counts and layout problems of a prepared tree
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("glyphset v{}", glyphset_core::VERSION);

    match cli.command {
        Commands::Prepare(args) => cli::prepare::execute(args, &config).await,
        Commands::Normalize(args) => cli::stages::normalize(args, &config).await,
        Commands::Bucketize(args) => cli::stages::bucketize(args),
        Commands::Renumber(args) => cli::stages::renumber(args, &config),
        Commands::Inspect(args) => cli::inspect::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()),
    }
}

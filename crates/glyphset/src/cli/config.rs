//! The `glyphset config` command for configuration management.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use glyphset_core::{expand_path, Config};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show the config file path
    Path,

    /// Write a config file with defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command. `explicit` is the `--config` path, if any.
pub fn execute(args: ConfigArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path(explicit);

    match args.command {
        ConfigCommand::Show => {
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            print!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            init(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(expand_path).unwrap_or_else(Config::default_path)
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

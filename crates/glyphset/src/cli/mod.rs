//! Command implementations.

pub mod config;
pub mod inspect;
pub mod prepare;
pub mod stages;
mod summary;
pub mod types;

use std::path::Path;

use glyphset_core::{expand_path, Config};

/// Load the configuration for this run.
///
/// An explicit `--config` file must load cleanly. The default location is
/// optional: a broken default file falls back to defaults with a warning.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let path = expand_path(path);
        return Config::load_from(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()));
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `glyphset config path`."
            );
            Ok(Config::default())
        }
    }
}

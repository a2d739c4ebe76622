//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.
//! Logs go to stderr; stdout is reserved for reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter (`info`, `debug`, ...); the RUST_LOG
/// environment variable overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// `--verbose` raises the level to at least `debug`; `--json-logs` forces
/// JSON output.
pub fn init_from_config(
    config: &glyphset_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

fn effective_level(configured: &str, verbose: bool) -> &str {
    if verbose && configured != "trace" {
        "debug"
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_to_debug() {
        assert_eq!(effective_level("info", true), "debug");
        assert_eq!(effective_level("warn", true), "debug");
    }

    #[test]
    fn verbose_keeps_trace() {
        assert_eq!(effective_level("trace", true), "trace");
    }

    #[test]
    fn configured_level_without_verbose() {
        assert_eq!(effective_level("warn", false), "warn");
    }
}

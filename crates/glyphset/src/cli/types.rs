//! CLI enum types shared by several commands.

use clap::ValueEnum;

/// Report output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for glyphset_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => glyphset_core::OutputFormat::Json,
            OutputFormat::Jsonl => glyphset_core::OutputFormat::JsonLines,
        }
    }
}

/// Pick the CLI format if given, else the config default.
pub fn resolve_format(
    cli: Option<OutputFormat>,
    config: &glyphset_core::Config,
) -> glyphset_core::OutputFormat {
    match cli {
        Some(format) => format.into(),
        None => glyphset_core::OutputFormat::parse(&config.output.format)
            .unwrap_or(glyphset_core::OutputFormat::Json),
    }
}

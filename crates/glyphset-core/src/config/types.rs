//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions the Normalizer picks up from the source directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["png".to_string()],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Renamer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenumberConfig {
    /// Leave directories whose files are already `<label>_<0..n>` untouched.
    /// Turning this off renumbers every directory on every run.
    pub skip_sequential: bool,
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            skip_sequential: true,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got {:?}",
                self.output.format
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}",
                LOG_LEVELS
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {:?}",
                LOG_FORMATS
            )));
        }
        Ok(())
    }
}

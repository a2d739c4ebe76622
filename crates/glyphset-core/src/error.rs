//! Error types for the glyphset dataset preparation pipeline.
//!
//! Errors are organized by stage to provide clear, actionable error messages
//! that include relevant context (file paths, stage names, specific issues).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for glyphset operations.
#[derive(Error, Debug)]
pub enum GlyphsetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A filesystem operation (create, write, move, rename) failed
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A move or rename target is already taken
    #[error("Conflict at {path}: {message}")]
    Conflict { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Filename carries no label (empty or hidden)
    #[error("No label in filename: {0}")]
    MissingLabel(PathBuf),
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Short machine-friendly name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode { .. } => "decode",
            PipelineError::Io { .. } => "io",
            PipelineError::Conflict { .. } => "conflict",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::FileTooLarge { .. } => "file_too_large",
            PipelineError::ImageTooLarge { .. } => "image_too_large",
            PipelineError::UnsupportedFormat { .. } => "unsupported_format",
            PipelineError::FileNotFound(_) => "not_found",
            PipelineError::NotADirectory(_) => "not_a_directory",
            PipelineError::MissingLabel(_) => "missing_label",
        }
    }
}

/// Convenience type alias for glyphset results.
pub type Result<T> = std::result::Result<T, GlyphsetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

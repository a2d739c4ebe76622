//! Core data types for the glyphset pipeline.
//!
//! Labels are encoded in filenames by convention (`5_123.png` is a `5`). They
//! are parsed once into a [`Label`] and carried alongside the pixels from then
//! on, rather than re-sliced out of strings at every step.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The class label of an image: the first character of its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(char);

impl Label {
    /// Derive the label from a filename.
    ///
    /// Returns `None` for empty names and hidden files (leading `.`), which
    /// cannot name a bucket directory.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name.chars().next() {
            Some('.') | None => None,
            Some(c) => Some(Self(c)),
        }
    }

    /// Derive the label from the final component of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::from_file_name)
    }

    /// The label character.
    pub fn as_char(&self) -> char {
        self.0
    }

    /// The bucket directory name for this label.
    pub fn dir_name(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded image together with its source path and label.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Path the image was read from
    pub path: PathBuf,
    /// Label derived from the filename
    pub label: Label,
    /// 8-bit grayscale pixel grid
    pub pixels: GrayImage,
}

impl ImageRecord {
    /// The original filename, used verbatim for the normalized copy.
    pub fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

/// Per-stage outcome counts, printed as the end-of-stage summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name ("normalize", "bucketize", "renumber")
    pub stage: String,
    /// Files handled successfully
    pub processed: u64,
    /// Files left alone on purpose (hidden files, already-sequential dirs)
    pub skipped: u64,
    /// Files that failed
    pub failed: u64,
}

impl StageReport {
    /// Create an empty report for a stage.
    pub fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            ..Default::default()
        }
    }

    /// Total number of files the stage looked at.
    pub fn total(&self) -> u64 {
        self.processed + self.skipped + self.failed
    }
}

/// Files written, skipped and failed by one Normalizer run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Number of normalized images written to the destination
    pub written: u64,
    /// Files without a label (hidden files)
    pub skipped: u64,
    /// Failures, one per file, in processing order
    pub failures: Vec<FileFailure>,
}

impl NormalizeReport {
    /// Collapse into the common per-stage summary.
    pub fn summary(&self) -> StageReport {
        StageReport {
            stage: "normalize".to_string(),
            processed: self.written,
            skipped: self.skipped,
            failed: self.failures.len() as u64,
        }
    }
}

/// A file that could not be processed, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// Offending file
    pub path: PathBuf,
    /// Error kind ("decode", "io", ...)
    pub kind: String,
    /// Human-readable error message
    pub message: String,
}

/// A single planned or applied move/rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMove {
    /// Current path
    pub from: PathBuf,
    /// Target path
    pub to: PathBuf,
}

/// Outcome of one Bucketizer run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketReport {
    /// Files moved into their bucket
    pub moved: u64,
    /// Bucket directories that had to be created
    pub buckets_created: Vec<Label>,
    /// Top-level files left in place because they carry no label
    pub skipped: Vec<PathBuf>,
}

impl BucketReport {
    /// Collapse into the common per-stage summary.
    pub fn summary(&self) -> StageReport {
        StageReport {
            stage: "bucketize".to_string(),
            processed: self.moved,
            skipped: self.skipped.len() as u64,
            failed: 0,
        }
    }
}

/// Outcome of one Renamer run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameReport {
    /// Directories visited
    pub directories: u64,
    /// Files renamed
    pub renamed: u64,
    /// Files already at their target name
    pub unchanged: u64,
    /// Directories skipped because they were already sequential
    pub already_sequential: Vec<PathBuf>,
    /// Hidden files left alone
    pub skipped: u64,
}

impl RenameReport {
    /// Collapse into the common per-stage summary.
    pub fn summary(&self) -> StageReport {
        StageReport {
            stage: "renumber".to_string(),
            processed: self.renamed + self.unchanged,
            skipped: self.skipped,
            failed: 0,
        }
    }
}

/// Combined outcome of a full normalize → bucketize → renumber run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    pub normalize: NormalizeReport,
    pub bucketize: BucketReport,
    pub renumber: RenameReport,
}

impl PipelineReport {
    /// Summaries of all three stages, in execution order.
    pub fn summaries(&self) -> Vec<StageReport> {
        vec![
            self.normalize.summary(),
            self.bucketize.summary(),
            self.renumber.summary(),
        ]
    }
}

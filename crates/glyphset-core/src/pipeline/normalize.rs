//! Normalizer: resize every source image to 24×24 and stretch its contrast.
//!
//! The transformation is fixed:
//! - grayscale, 8 bits per sample
//! - `TARGET_SIZE × TARGET_SIZE`, Lanczos3 resampling
//! - min-max stretch over the whole image, uniform images become all zeros
//!
//! Per-file failures are logged and counted; they never abort the batch.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::math::stretch_samples;
use crate::types::{FileFailure, ImageRecord, Label, NormalizeReport};

use super::decode::ImageDecoder;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::validate::Validator;

/// Side length of every normalized image.
pub const TARGET_SIZE: u32 = 24;

/// Resampling filter used for the resize.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Resize and contrast-stretch one image.
pub fn normalize_pixels(image: &DynamicImage) -> GrayImage {
    let resized = image
        .resize_exact(TARGET_SIZE, TARGET_SIZE, RESAMPLE_FILTER)
        .to_luma8();
    let stretched = stretch_samples(resized.as_raw());
    // Same dimensions, same sample count
    GrayImage::from_raw(TARGET_SIZE, TARGET_SIZE, stretched).unwrap_or(resized)
}

/// Validates, decodes, normalizes and writes source images.
pub struct Normalizer {
    decoder: ImageDecoder,
    validator: Validator,
    discovery: FileDiscovery,
}

impl Normalizer {
    /// Create a new normalizer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
        }
    }

    /// Discover the qualifying images in a source directory.
    pub fn discover(&self, source: &Path) -> PipelineResult<Vec<DiscoveredFile>> {
        self.discovery.discover(source)
    }

    /// Read one source image into a labeled record.
    pub async fn load(&self, path: &Path) -> PipelineResult<ImageRecord> {
        let label =
            Label::from_path(path).ok_or_else(|| PipelineError::MissingLabel(path.to_path_buf()))?;
        self.validator.validate(path)?;
        let decoded = self.decoder.decode(path).await?;
        Ok(ImageRecord {
            path: path.to_path_buf(),
            label,
            pixels: decoded.image.to_luma8(),
        })
    }

    /// Normalize a single file into `dest_dir`, keeping its filename.
    ///
    /// Returns the path written.
    pub async fn normalize_file(&self, path: &Path, dest_dir: &Path) -> PipelineResult<PathBuf> {
        let record = self.load(path).await?;
        let dest = dest_dir.join(record.file_name());
        let normalized = normalize_pixels(&DynamicImage::ImageLuma8(record.pixels));
        write_image(&normalized, &dest)?;
        tracing::debug!("Normalized {:?} (label {}) -> {:?}", path, record.label, dest);
        Ok(dest)
    }

    /// Normalize every qualifying image of `source` into `dest`.
    pub async fn normalize(&self, source: &Path, dest: &Path) -> PipelineResult<NormalizeReport> {
        let files = self.discover(source)?;
        self.normalize_files(source, &files, dest, |_, _| {}).await
    }

    /// Normalize an already discovered file list, calling `on_file` after
    /// each file (used for progress reporting).
    ///
    /// The destination is created if needed and must not be the source
    /// directory, since sources are never modified.
    pub async fn normalize_files<F>(
        &self,
        source: &Path,
        files: &[DiscoveredFile],
        dest: &Path,
        mut on_file: F,
    ) -> PipelineResult<NormalizeReport>
    where
        F: FnMut(&DiscoveredFile, &PipelineResult<PathBuf>),
    {
        std::fs::create_dir_all(dest).map_err(|e| PipelineError::io(dest, e))?;
        if same_dir(source, dest) {
            return Err(PipelineError::Conflict {
                path: dest.to_path_buf(),
                message: "destination is the source directory".to_string(),
            });
        }

        let mut report = NormalizeReport::default();
        for file in files {
            let result = self.normalize_file(&file.path, dest).await;
            match &result {
                Ok(_) => report.written += 1,
                Err(PipelineError::MissingLabel(path)) => {
                    tracing::warn!("Skipped {:?}: no label in filename", path);
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed: {:?} - {}", file.path, e);
                    report.failures.push(FileFailure {
                        path: file.path.clone(),
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
            on_file(file, &result);
        }

        tracing::info!(
            "Normalized {} of {} image(s) from {:?} into {:?} ({} failed)",
            report.written,
            files.len(),
            source,
            dest,
            report.failures.len()
        );
        Ok(report)
    }
}

/// Encode in memory, then write, so encoder and filesystem failures stay
/// distinguishable.
fn write_image(image: &GrayImage, dest: &Path) -> PipelineResult<()> {
    let format = ImageFormat::from_path(dest).map_err(|_| PipelineError::UnsupportedFormat {
        path: dest.to_path_buf(),
        format: dest
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    })?;
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|e| PipelineError::Io {
            path: dest.to_path_buf(),
            message: format!("Cannot encode image: {}", e),
        })?;
    std::fs::write(dest, buffer.into_inner()).map_err(|e| PipelineError::io(dest, e))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

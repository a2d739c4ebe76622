//! Image decoding with format detection, validation, and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image file.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    ///
    /// Decoding runs on a blocking worker so a pathological file cannot stall
    /// the runtime past `decode_timeout_ms`.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

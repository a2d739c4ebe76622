//! Cheap checks run before a file is handed to the decoder.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Leading bytes of the raster formats a glyph dataset is likely to contain.
const SIGNATURES: &[(&str, &[u8])] = &[
    ("png", b"\x89PNG\r\n\x1a\n"),
    ("jpeg", b"\xFF\xD8\xFF"),
    ("gif", b"GIF8"),
    ("bmp", b"BM"),
    ("tiff", b"II\x2A\x00"),
    ("tiff", b"MM\x00\x2A"),
    ("pgm", b"P5"),
    ("pgm", b"P2"),
];

/// Validates files before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that the file exists, is within the size limit, and starts
    /// with a known image signature.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(PipelineError::io(path, e)),
        };

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mut header = Vec::with_capacity(12);
        std::fs::File::open(path)
            .and_then(|f| f.take(12).read_to_end(&mut header))
            .map_err(|e| PipelineError::io(path, e))?;

        if sniff_format(&header).is_none() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image signature".to_string(),
            });
        }
        Ok(())
    }
}

/// Identify an image format from its leading bytes.
///
/// WebP needs 12 bytes: a RIFF container whose form type is `WEBP`.
pub fn sniff_format(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(b"RIFF") {
        return (header.get(8..12) == Some(b"WEBP".as_slice())).then_some("webp");
    }
    SIGNATURES
        .iter()
        .find(|(_, magic)| header.starts_with(magic))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_png() {
        assert_eq!(
            sniff_format(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("png")
        );
    }

    #[test]
    fn test_sniff_truncated_png_rejected() {
        assert_eq!(sniff_format(&[0x89, b'P', b'N']), None);
    }

    #[test]
    fn test_sniff_pgm_and_tiff() {
        assert_eq!(sniff_format(b"P5\n24 24\n255\n"), Some("pgm"));
        assert_eq!(sniff_format(&[b'I', b'I', 0x2A, 0x00, 8, 0]), Some("tiff"));
        assert_eq!(sniff_format(&[b'I', b'I', 0x00, 0x00]), None);
    }

    #[test]
    fn test_sniff_webp() {
        assert_eq!(sniff_format(b"RIFF\x24\x00\x00\x00WEBPVP8L"), Some("webp"));
        assert_eq!(sniff_format(b"RIFF\x24\x00\x00\x00WAVEfmt "), None);
        assert_eq!(sniff_format(b"RIFF\x24\x00"), None);
    }

    #[test]
    fn test_validate_accepts_webp_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2_0.webp");
        std::fs::write(&path, b"RIFF\x24\x00\x00\x00WEBPVP8L\x2f\x00").unwrap();

        let validator = Validator::new(LimitsConfig::default());
        assert!(validator.validate(&path).is_ok());
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let validator = Validator::new(LimitsConfig::default());
        let err = validator
            .validate(&dir.path().join("4_0.png"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("4_0.png");
        std::fs::write(&path, "definitely not pixels").unwrap();

        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate(&path).unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("4_0.png");
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(1024 * 1024 + 1, 0);
        std::fs::write(&path, bytes).unwrap();

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let err = Validator::new(limits).validate(&path).unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { max_mb: 1, .. }));
    }
}

//! File discovery for the Normalizer's flat source directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::PipelineError;

/// Discovers image files directly inside a source directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files in `dir`.
    ///
    /// The source layout is flat, so only the directory's own entries are
    /// considered. Results are sorted by path.
    pub fn discover(&self, dir: &Path) -> Result<Vec<DiscoveredFile>, PipelineError> {
        if !dir.exists() {
            return Err(PipelineError::FileNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(PipelineError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| PipelineError::Io {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_defaults_to_png() {
        let discovery = FileDiscovery::new(ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("5_0.png")));
        assert!(discovery.is_supported(Path::new("5_0.PNG")));
        assert!(!discovery.is_supported(Path::new("5_0.jpg")));
        assert!(!discovery.is_supported(Path::new("labels.txt")));
        assert!(!discovery.is_supported(Path::new("png")));
    }

    #[test]
    fn test_discover_is_flat_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["7_1.png", "1_0.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("3")).unwrap();
        std::fs::write(dir.path().join("3").join("3_0.png"), b"x").unwrap();

        let discovery = FileDiscovery::new(ProcessingConfig::default());
        let files = discovery.discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["1_0.png", "7_1.png"]);
        assert_eq!(FileDiscovery::total_size(&files), 2);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = FileDiscovery::new(ProcessingConfig::default());
        let err = discovery.discover(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}

//! Sorted, in-memory snapshot of a directory listing.
//!
//! The Bucketizer and Renamer move files out from under the directory they
//! are reading, so they always plan from a snapshot taken before the first
//! mutation.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Entries of one directory, split by kind and sorted by name.
#[derive(Debug, Clone, Default)]
pub struct DirSnapshot {
    /// The directory the snapshot was taken of
    pub dir: PathBuf,
    /// Regular file names
    pub files: Vec<String>,
    /// Subdirectory names
    pub dirs: Vec<String>,
    /// Entries whose names are not valid UTF-8
    pub unreadable: Vec<PathBuf>,
}

impl DirSnapshot {
    /// List `dir` once and sort the result.
    ///
    /// Symlinks are classified by what they point at.
    pub fn take(dir: &Path) -> Result<Self, PipelineError> {
        if !dir.exists() {
            return Err(PipelineError::FileNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(PipelineError::NotADirectory(dir.to_path_buf()));
        }

        let mut snapshot = DirSnapshot {
            dir: dir.to_path_buf(),
            ..Default::default()
        };
        let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
            let path = entry.path();
            let Ok(name) = entry.file_name().into_string() else {
                snapshot.unreadable.push(path);
                continue;
            };
            let metadata = std::fs::metadata(&path).map_err(|e| PipelineError::io(&path, e))?;
            if metadata.is_dir() {
                snapshot.dirs.push(name);
            } else if metadata.is_file() {
                snapshot.files.push(name);
            }
        }

        snapshot.files.sort();
        snapshot.dirs.sort();
        Ok(snapshot)
    }

    /// Whether a regular file with this name was present.
    pub fn has_file(&self, name: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(name)).is_ok()
    }

    /// Whether a subdirectory with this name was present.
    pub fn has_dir(&self, name: &str) -> bool {
        self.dirs.binary_search_by(|d| d.as_str().cmp(name)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_splits_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["9_2.png", "1_5.png", "1_0.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("4")).unwrap();

        let snapshot = DirSnapshot::take(dir.path()).unwrap();
        assert_eq!(snapshot.files, vec!["1_0.png", "1_5.png", "9_2.png"]);
        assert_eq!(snapshot.dirs, vec!["4"]);
        assert!(snapshot.has_file("1_5.png"));
        assert!(!snapshot.has_file("4"));
        assert!(snapshot.has_dir("4"));
    }

    #[test]
    fn test_snapshot_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("5_0.png");
        std::fs::write(&file, b"x").unwrap();
        let err = DirSnapshot::take(&file).unwrap_err();
        assert!(matches!(err, PipelineError::NotADirectory(_)));
    }
}

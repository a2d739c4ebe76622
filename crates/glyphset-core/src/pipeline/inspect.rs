//! Read-only check of a prepared dataset tree.
//!
//! A prepared tree is `root/<label>/<label>_<index><ext>` with dense indices
//! per bucket. The inspector counts files per label and reports every place
//! the tree deviates from that layout.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::PipelineResult;
use crate::types::Label;

use super::rename::parse_sequential;
use super::snapshot::DirSnapshot;

/// Number of files in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: Label,
    pub files: u64,
}

/// A deviation from the prepared layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutIssue {
    /// A labeled file still sits at the top level
    TopLevelFile { path: PathBuf },
    /// A bucket directory whose name is not a single character
    BadBucketName { path: PathBuf },
    /// A directory nested inside a bucket
    NestedDirectory { path: PathBuf },
    /// A file whose label differs from its bucket
    LabelMismatch { path: PathBuf, bucket: String },
    /// A file not named `<label>_<index><ext>`
    NotSequential { path: PathBuf },
    /// Two files share an index in the same bucket
    DuplicateIndex { dir: PathBuf, index: u64 },
    /// Indices missing from `0..n` in a bucket
    IndexGap { dir: PathBuf, missing: Vec<u64> },
}

/// Per-label counts and layout issues of a prepared tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetSummary {
    pub root: PathBuf,
    pub labels: Vec<LabelCount>,
    pub total_files: u64,
    pub issues: Vec<LayoutIssue>,
}

impl DatasetSummary {
    /// True when the tree matches the prepared layout exactly.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspect a prepared tree without modifying it.
pub fn inspect(root: &Path) -> PipelineResult<DatasetSummary> {
    let top = DirSnapshot::take(root)?;
    let mut summary = DatasetSummary {
        root: root.to_path_buf(),
        ..Default::default()
    };

    for name in &top.files {
        if Label::from_file_name(name).is_some() {
            summary.issues.push(LayoutIssue::TopLevelFile {
                path: root.join(name),
            });
        }
    }

    let mut counts: BTreeMap<Label, u64> = BTreeMap::new();
    for bucket in &top.dirs {
        let dir = root.join(bucket);
        let bucket_label = match Label::from_file_name(bucket) {
            Some(label) if bucket.chars().count() == 1 => label,
            _ => {
                summary
                    .issues
                    .push(LayoutIssue::BadBucketName { path: dir.clone() });
                continue;
            }
        };

        let snapshot = DirSnapshot::take(&dir)?;
        for nested in &snapshot.dirs {
            summary.issues.push(LayoutIssue::NestedDirectory {
                path: dir.join(nested),
            });
        }

        let mut seen = BTreeSet::new();
        let mut files = 0u64;
        for name in &snapshot.files {
            let Some(label) = Label::from_file_name(name) else {
                continue;
            };
            files += 1;
            let path = dir.join(name);
            if label != bucket_label {
                summary.issues.push(LayoutIssue::LabelMismatch {
                    path: path.clone(),
                    bucket: bucket.clone(),
                });
            }
            match parse_sequential(name) {
                Some((_, index)) => {
                    if !seen.insert(index) {
                        summary.issues.push(LayoutIssue::DuplicateIndex {
                            dir: dir.clone(),
                            index,
                        });
                    }
                }
                None => summary.issues.push(LayoutIssue::NotSequential { path }),
            }
        }

        let missing: Vec<u64> = (0..seen.len() as u64)
            .filter(|i| !seen.contains(i))
            .collect();
        if !missing.is_empty() {
            summary.issues.push(LayoutIssue::IndexGap { dir, missing });
        }

        *counts.entry(bucket_label).or_default() += files;
        summary.total_files += files;
    }

    summary.labels = counts
        .into_iter()
        .map(|(label, files)| LabelCount { label, files })
        .collect();

    tracing::debug!(
        "Inspected {:?}: {} file(s) in {} bucket(s), {} issue(s)",
        root,
        summary.total_files,
        summary.labels.len(),
        summary.issues.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(root: &Path, files: &[&str]) {
        for rel in files {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"x").unwrap();
        }
    }

    #[test]
    fn test_valid_tree() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["5/5_0.png", "5/5_1.png", "3/3_0.png"]);

        let summary = inspect(root.path()).unwrap();
        assert!(summary.is_valid(), "{:?}", summary.issues);
        assert_eq!(summary.total_files, 3);
        let counts: Vec<_> = summary
            .labels
            .iter()
            .map(|c| (c.label.as_char(), c.files))
            .collect();
        assert_eq!(counts, vec![('3', 1), ('5', 2)]);
    }

    #[test]
    fn test_reports_gap_and_top_level_file() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["7_3.png", "2/2_0.png", "2/2_2.png"]);

        let summary = inspect(root.path()).unwrap();
        assert!(!summary.is_valid());
        assert!(summary.issues.contains(&LayoutIssue::TopLevelFile {
            path: root.path().join("7_3.png")
        }));
        assert!(summary.issues.contains(&LayoutIssue::IndexGap {
            dir: root.path().join("2"),
            missing: vec![1],
        }));
    }

    #[test]
    fn test_reports_label_mismatch_and_unsequenced_names() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["4/4_0.png", "4/9_1.png", "4/4_raw.png"]);

        let summary = inspect(root.path()).unwrap();
        assert!(summary.issues.contains(&LayoutIssue::LabelMismatch {
            path: root.path().join("4").join("9_1.png"),
            bucket: "4".to_string(),
        }));
        assert!(summary.issues.contains(&LayoutIssue::NotSequential {
            path: root.path().join("4").join("4_raw.png"),
        }));
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = LayoutIssue::DuplicateIndex {
            dir: PathBuf::from("1"),
            index: 0,
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"kind\":\"duplicate_index\""));
    }
}

//! Bucketizer: move each top-level file into a subdirectory named after its
//! label.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{BucketReport, Label};

use super::snapshot::DirSnapshot;

/// One planned move into a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketMove {
    pub label: Label,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Every move a Bucketizer run would make, computed from a single snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BucketPlan {
    /// Directory being restructured
    pub root: PathBuf,
    /// Moves in snapshot (name) order
    pub moves: Vec<BucketMove>,
    /// Buckets that do not exist yet
    pub new_buckets: Vec<Label>,
    /// Top-level files without a label
    pub skipped: Vec<PathBuf>,
}

impl BucketPlan {
    /// True when there is nothing to move.
    pub fn is_noop(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Restructures a flat directory into per-label buckets.
pub struct Bucketizer;

impl Bucketizer {
    /// Plan the restructuring of `dir` without touching the filesystem.
    ///
    /// Existing subdirectories are never candidates. Fails with `Conflict`
    /// when a bucket path is occupied by a file or a move target already
    /// exists inside its bucket.
    pub fn plan(dir: &Path) -> PipelineResult<BucketPlan> {
        let snapshot = DirSnapshot::take(dir)?;
        let mut plan = BucketPlan {
            root: dir.to_path_buf(),
            skipped: snapshot.unreadable.clone(),
            ..Default::default()
        };
        let mut new_buckets = BTreeSet::new();

        for name in &snapshot.files {
            let from = dir.join(name);
            let Some(label) = Label::from_file_name(name) else {
                plan.skipped.push(from);
                continue;
            };

            let bucket = label.dir_name();
            if snapshot.has_file(&bucket) {
                return Err(PipelineError::Conflict {
                    path: dir.join(&bucket),
                    message: format!("a file occupies the path of bucket '{}'", label),
                });
            }

            let to = dir.join(&bucket).join(name);
            if snapshot.has_dir(&bucket) {
                if to.symlink_metadata().is_ok() {
                    return Err(PipelineError::Conflict {
                        path: to,
                        message: "target already exists in bucket".to_string(),
                    });
                }
            } else {
                new_buckets.insert(label);
            }

            plan.moves.push(BucketMove { label, from, to });
        }

        plan.new_buckets = new_buckets.into_iter().collect();
        Ok(plan)
    }

    /// Apply a plan: create missing buckets, then move files one by one.
    ///
    /// Each move is a single `rename`, so a file is either at its old path or
    /// in its bucket. The first failure aborts the run.
    pub fn apply(plan: &BucketPlan) -> PipelineResult<BucketReport> {
        let mut report = BucketReport {
            skipped: plan.skipped.clone(),
            ..Default::default()
        };

        for label in &plan.new_buckets {
            let bucket = plan.root.join(label.dir_name());
            match std::fs::create_dir(&bucket) {
                Ok(()) => {
                    tracing::debug!("Created bucket {:?}", bucket);
                    report.buckets_created.push(*label);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && bucket.is_dir() => {}
                Err(e) => return Err(PipelineError::io(&bucket, e)),
            }
        }

        for mv in &plan.moves {
            if mv.to.symlink_metadata().is_ok() {
                return Err(PipelineError::Conflict {
                    path: mv.to.clone(),
                    message: "target already exists in bucket".to_string(),
                });
            }
            std::fs::rename(&mv.from, &mv.to).map_err(|e| PipelineError::io(&mv.from, e))?;
            tracing::trace!("Moved {:?} -> {:?}", mv.from, mv.to);
            report.moved += 1;
        }

        for path in &report.skipped {
            tracing::warn!("Left unlabeled file in place: {:?}", path);
        }
        tracing::info!(
            "Bucketized {:?}: {} file(s) moved, {} bucket(s) created",
            plan.root,
            report.moved,
            report.buckets_created.len()
        );
        Ok(report)
    }
}

/// Move every labeled top-level file of `dir` into `dir/<label>/`.
pub fn bucketize(dir: &Path) -> PipelineResult<BucketReport> {
    let plan = Bucketizer::plan(dir)?;
    Bucketizer::apply(&plan)
}

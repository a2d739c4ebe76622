//! Pipeline orchestration: normalize → bucketize → renumber.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FileMove, Label, PipelineReport};

use super::bucket::bucketize;
use super::discovery::DiscoveredFile;
use super::normalize::Normalizer;
use super::rename::{plan_names, Renamer};
use super::snapshot::DirSnapshot;

/// Runs the three stages over a source and destination directory.
pub struct DatasetPipeline {
    normalizer: Normalizer,
    renamer: Renamer,
    skip_sequential: bool,
}

impl DatasetPipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(config),
            renamer: Renamer::new(config.renumber.clone()),
            skip_sequential: config.renumber.skip_sequential,
        }
    }

    /// The Normalizer stage, for callers that drive it file by file.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Run the whole pipeline.
    pub async fn run(&self, source: &Path, dest: &Path) -> PipelineResult<PipelineReport> {
        let files = self.normalizer.discover(source)?;
        self.run_with_progress(source, &files, dest, |_, _| {})
            .await
    }

    /// Run the whole pipeline over a discovered file list, reporting each
    /// normalized file to `on_file`.
    ///
    /// Normalizer failures are counted and skipped. A Bucketizer or Renamer
    /// failure aborts the run.
    ///
    /// `dest` must be missing, empty, or hold only flat copies this run
    /// overwrites (a run stopped during normalization). Anything else fails
    /// with `Conflict` before a file is written.
    pub async fn run_with_progress<F>(
        &self,
        source: &Path,
        files: &[DiscoveredFile],
        dest: &Path,
        on_file: F,
    ) -> PipelineResult<PipelineReport>
    where
        F: FnMut(&DiscoveredFile, &PipelineResult<PathBuf>),
    {
        let start = std::time::Instant::now();

        check_destination(files, dest)?;

        let normalize = self
            .normalizer
            .normalize_files(source, files, dest, on_file)
            .await?;
        tracing::trace!("  Normalize: {:?}", start.elapsed());

        let bucket_start = std::time::Instant::now();
        let bucketize = bucketize(dest)?;
        tracing::trace!("  Bucketize: {:?}", bucket_start.elapsed());

        let rename_start = std::time::Instant::now();
        let renumber = self.renamer.renumber(dest)?;
        tracing::trace!("  Renumber: {:?}", rename_start.elapsed());

        tracing::debug!("Prepared {:?} in {:?}", dest, start.elapsed());
        Ok(PipelineReport {
            normalize,
            bucketize,
            renumber,
        })
    }

    /// Predict where each source file will end up, without touching disk.
    ///
    /// Assumes every file normalizes successfully and `dest` starts empty.
    pub fn preview(&self, files: &[DiscoveredFile], dest: &Path) -> Vec<FileMove> {
        let mut buckets: BTreeMap<Label, Vec<(String, PathBuf)>> = BTreeMap::new();
        for file in files {
            let Some(name) = file.path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(label) = Label::from_file_name(name) {
                buckets
                    .entry(label)
                    .or_default()
                    .push((name.to_string(), file.path.clone()));
            }
        }

        let mut moves = Vec::new();
        for (label, mut entries) in buckets {
            entries.sort();
            let names: Vec<String> = entries.iter().map(|(n, _)| n.clone()).collect();
            let plan = plan_names(&names, self.skip_sequential);
            let bucket = dest.join(label.dir_name());
            for ((_, from), (_, to)) in entries.into_iter().zip(plan.pairs) {
                moves.push(FileMove {
                    from,
                    to: bucket.join(to),
                });
            }
        }
        moves
    }
}

/// Refuse a destination that already holds work from an earlier run.
///
/// Bucket directories or renamed files would be merged with the new copies
/// and renumbered with them, duplicating the dataset. Hidden files carry no
/// label and are ignored by every stage.
fn check_destination(files: &[DiscoveredFile], dest: &Path) -> PipelineResult<()> {
    if !dest.is_dir() {
        return Ok(());
    }

    let incoming: BTreeSet<&str> = files
        .iter()
        .filter_map(|f| f.path.file_name().and_then(|n| n.to_str()))
        .collect();
    let snapshot = DirSnapshot::take(dest)?;

    if let Some(dir) = snapshot.dirs.first() {
        return Err(PipelineError::Conflict {
            path: dest.join(dir),
            message: "destination already contains bucket directories".to_string(),
        });
    }
    let foreign = snapshot
        .files
        .iter()
        .filter(|name| Label::from_file_name(name).is_some())
        .find(|name| !incoming.contains(name.as_str()));
    if let Some(name) = foreign {
        return Err(PipelineError::Conflict {
            path: dest.join(name),
            message: "destination contains a file this run would not overwrite".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered(names: &[&str]) -> Vec<DiscoveredFile> {
        names
            .iter()
            .map(|n| DiscoveredFile {
                path: PathBuf::from("/src").join(n),
                size: 0,
            })
            .collect()
    }

    #[test]
    fn test_preview_scenario() {
        let pipeline = DatasetPipeline::new(&Config::default());
        let moves = pipeline.preview(
            &discovered(&["5_0.png", "5_1.png", "3_7.png"]),
            Path::new("/dest"),
        );

        let targets: Vec<_> = moves
            .iter()
            .map(|m| (m.from.clone(), m.to.clone()))
            .collect();
        assert_eq!(
            targets,
            vec![
                (PathBuf::from("/src/3_7.png"), PathBuf::from("/dest/3/3_0.png")),
                (PathBuf::from("/src/5_0.png"), PathBuf::from("/dest/5/5_0.png")),
                (PathBuf::from("/src/5_1.png"), PathBuf::from("/dest/5/5_1.png")),
            ]
        );
    }

    #[test]
    fn test_check_destination() {
        let dest = tempfile::tempdir().unwrap();
        let files = discovered(&["2_0.png", "2_5.png"]);
        assert!(check_destination(&files, &dest.path().join("missing")).is_ok());

        // Leftover flat copies and hidden files are fine
        std::fs::write(dest.path().join("2_5.png"), b"x").unwrap();
        std::fs::write(dest.path().join(".DS_Store"), b"x").unwrap();
        assert!(check_destination(&files, dest.path()).is_ok());

        std::fs::write(dest.path().join("2_9.png"), b"x").unwrap();
        let err = check_destination(&files, dest.path()).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        std::fs::remove_file(dest.path().join("2_9.png")).unwrap();

        std::fs::create_dir(dest.path().join("2")).unwrap();
        let err = check_destination(&files, dest.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Conflict { path, .. } if path.ends_with("2")));
    }

    #[test]
    fn test_preview_skips_unlabeled() {
        let pipeline = DatasetPipeline::new(&Config::default());
        let moves = pipeline.preview(&discovered(&[".hidden.png", "1_4.png"]), Path::new("/d"));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, PathBuf::from("/d/1/1_0.png"));
    }
}

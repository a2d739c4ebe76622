//! Renamer: renumber the files of every directory to `<label>_<index><ext>`.
//!
//! Each directory is planned from its own snapshot with its own counter, so
//! directories can be processed (and tested) in isolation. Indices follow the
//! sorted order of the snapshot, which makes the output reproducible.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::RenumberConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FileMove, Label, RenameReport};

use super::snapshot::DirSnapshot;

/// Target names for one directory's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePlan {
    /// `(current name, target name)` in index order
    pub pairs: Vec<(String, String)>,
    /// The names already formed a dense sequence and are kept as-is
    pub already_sequential: bool,
}

/// What renumbering one directory will do.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirPlan {
    /// Directory being renumbered
    pub dir: PathBuf,
    /// Renames that change a name
    pub renames: Vec<FileMove>,
    /// Files already at their target name
    pub unchanged: u64,
    /// Hidden or non-UTF-8 files left alone
    pub skipped: u64,
    /// Directory was left untouched because it is already sequential
    pub already_sequential: bool,
}

/// Build the sequential name for the `index`-th file of a directory.
///
/// The label is the first character of `name` and the extension is carried
/// over: index 3 of `7_foo.png` is `7_3.png`.
pub fn target_name(label: Label, index: usize, name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", label, index, ext),
        None => format!("{}_{}", label, index),
    }
}

/// Split a `<label>_<index><ext>` name into its label and index.
///
/// Returns `None` for names that do not follow the scheme. Leading zeros
/// are rejected since the Renamer never produces them.
pub fn parse_sequential(name: &str) -> Option<(Label, u64)> {
    let label = Label::from_file_name(name)?;
    let rest = name[label.as_char().len_utf8()..].strip_prefix('_')?;
    let stem = Path::new(rest).file_stem()?.to_str()?;
    let digits = if Path::new(rest).extension().is_some() {
        stem
    } else {
        rest
    };
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok().map(|index| (label, index))
}

/// Whether `names` are exactly `{0, .., n-1}` under the scheme.
fn is_sequential(names: &[String]) -> bool {
    let mut seen = BTreeSet::new();
    for name in names {
        match parse_sequential(name) {
            Some((_, index)) if index < names.len() as u64 && seen.insert(index) => {}
            _ => return false,
        }
    }
    true
}

/// Assign target names to the labeled files of one directory.
///
/// `names` must be sorted and contain only labeled names. The counter is
/// local to this call and starts at zero.
pub fn plan_names(names: &[String], skip_sequential: bool) -> NamePlan {
    if skip_sequential && !names.is_empty() && is_sequential(names) {
        return NamePlan {
            pairs: names.iter().map(|n| (n.clone(), n.clone())).collect(),
            already_sequential: true,
        };
    }

    let mut pairs = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if let Some(label) = Label::from_file_name(name) {
            pairs.push((name.clone(), target_name(label, index, name)));
        }
    }
    NamePlan {
        pairs,
        already_sequential: false,
    }
}

/// Renumbers files directory by directory.
pub struct Renamer {
    config: RenumberConfig,
}

impl Renamer {
    /// Create a new renamer with the given configuration.
    pub fn new(config: RenumberConfig) -> Self {
        Self { config }
    }

    /// Plan the renumbering of a single directory (no recursion).
    pub fn plan_dir(&self, dir: &Path) -> PipelineResult<DirPlan> {
        let snapshot = DirSnapshot::take(dir)?;
        let labeled: Vec<String> = snapshot
            .files
            .iter()
            .filter(|name| Label::from_file_name(name).is_some())
            .cloned()
            .collect();

        let mut plan = DirPlan {
            dir: dir.to_path_buf(),
            skipped: (snapshot.files.len() - labeled.len() + snapshot.unreadable.len()) as u64,
            ..Default::default()
        };

        let names = plan_names(&labeled, self.config.skip_sequential);
        if names.already_sequential {
            plan.already_sequential = true;
            plan.unchanged = names.pairs.len() as u64;
            return Ok(plan);
        }

        for (from, to) in names.pairs {
            if snapshot.has_dir(&to) {
                return Err(PipelineError::Conflict {
                    path: dir.join(&to),
                    message: format!("a directory is in the way of renaming {}", from),
                });
            }
            if from == to {
                plan.unchanged += 1;
            } else {
                plan.renames.push(FileMove {
                    from: dir.join(from),
                    to: dir.join(to),
                });
            }
        }
        Ok(plan)
    }

    /// Plan every directory under `root` (including `root`), in walk order.
    pub fn plan(&self, root: &Path) -> PipelineResult<Vec<DirPlan>> {
        directories(root)?
            .iter()
            .map(|dir| self.plan_dir(dir))
            .collect()
    }

    /// Renumber every directory under `root`.
    ///
    /// The directory list is collected before anything is renamed; renames
    /// never create or remove directories, so the list stays valid. The first
    /// failure aborts the run.
    pub fn renumber(&self, root: &Path) -> PipelineResult<RenameReport> {
        let mut report = RenameReport::default();
        for dir in directories(root)? {
            let plan = self.plan_dir(&dir)?;
            report.directories += 1;
            report.skipped += plan.skipped;
            report.unchanged += plan.unchanged;
            if plan.already_sequential {
                tracing::debug!("{:?} is already sequential, leaving it alone", dir);
                report.already_sequential.push(dir);
                continue;
            }
            report.renamed += apply_dir(&plan)?;
        }

        tracing::info!(
            "Renumbered {:?}: {} file(s) renamed across {} directories ({} already sequential)",
            root,
            report.renamed,
            report.directories,
            report.already_sequential.len()
        );
        Ok(report)
    }
}

/// Renumber every directory under `root` with the default configuration.
pub fn renumber(root: &Path) -> PipelineResult<RenameReport> {
    Renamer::new(RenumberConfig::default()).renumber(root)
}

/// All directories under `root`, sorted, root first.
fn directories(root: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(PipelineError::FileNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(PipelineError::NotADirectory(root.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| PipelineError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Apply one directory's renames in two phases.
///
/// Every moving file is first parked under a unique temporary name, then
/// moved to its target. Targets are unique within the directory and files
/// that keep their name are never targeted by another file, so no rename
/// can overwrite a file.
fn apply_dir(plan: &DirPlan) -> PipelineResult<u64> {
    let mut parked = Vec::with_capacity(plan.renames.len());
    for (i, mv) in plan.renames.iter().enumerate() {
        // Existing names, including files parked by an earlier run, are taken
        let mut slot = i;
        let mut temp = parking_path(&mv.from, slot);
        while temp.symlink_metadata().is_ok() {
            slot += plan.renames.len();
            temp = parking_path(&mv.from, slot);
        }
        std::fs::rename(&mv.from, &temp).map_err(|e| PipelineError::io(&mv.from, e))?;
        parked.push((temp, &mv.to));
    }

    for (temp, to) in &parked {
        if to.symlink_metadata().is_ok() {
            return Err(PipelineError::Conflict {
                path: to.to_path_buf(),
                message: "rename target already exists".to_string(),
            });
        }
        std::fs::rename(temp, to).map_err(|e| PipelineError::io(temp, e))?;
        tracing::trace!("Renamed {:?} -> {:?}", temp, to);
    }
    Ok(parked.len() as u64)
}

/// Temporary name that keeps the label and extension, so a run interrupted
/// between the two phases is picked up again by the next one.
fn parking_path(from: &Path, slot: usize) -> PathBuf {
    let name = from
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let label = name.chars().next().unwrap_or('_');
    let parked = match from.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.renumber-{}-{}.{}", label, std::process::id(), slot, ext),
        None => format!("{}.renumber-{}-{}", label, std::process::id(), slot),
    };
    from.with_file_name(parked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    fn names_in(dir: &Path) -> Vec<String> {
        DirSnapshot::take(dir).unwrap().files
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_target_name() {
        let label = Label::from_file_name("7").unwrap();
        assert_eq!(target_name(label, 3, "7_foo.png"), "7_3.png");
        assert_eq!(target_name(label, 0, "7raw"), "7_0");
        assert_eq!(target_name(label, 12, "7.tar.gz"), "7_12.gz");
    }

    #[test]
    fn test_parse_sequential() {
        let (label, index) = parse_sequential("5_12.png").unwrap();
        assert_eq!(label.as_char(), '5');
        assert_eq!(index, 12);
        assert_eq!(parse_sequential("5_0").map(|(_, i)| i), Some(0));
        assert!(parse_sequential("5_01.png").is_none());
        assert!(parse_sequential("5_x.png").is_none());
        assert!(parse_sequential("5-1.png").is_none());
        assert!(parse_sequential("5_.png").is_none());
        assert!(parse_sequential(".5_1.png").is_none());
    }

    #[test]
    fn test_plan_names_resets_counter_and_keeps_label() {
        let plan = plan_names(&strings(&["3_7.png", "3_9.png", "3_x.png"]), true);
        assert!(!plan.already_sequential);
        let targets: Vec<_> = plan.pairs.iter().map(|(_, to)| to.as_str()).collect();
        assert_eq!(targets, vec!["3_0.png", "3_1.png", "3_2.png"]);
        for (from, to) in &plan.pairs {
            assert_eq!(from.chars().next(), to.chars().next());
        }
    }

    #[test]
    fn test_plan_names_detects_sequential() {
        let mut names: Vec<String> = (0..11).map(|i| format!("5_{}.png", i)).collect();
        names.sort();
        assert!(plan_names(&names, true).already_sequential);
        assert!(!plan_names(&names, false).already_sequential);
        assert!(!plan_names(&strings(&["5_1.png", "5_2.png"]), true).already_sequential);
    }

    #[test]
    fn test_renumber_scenario() {
        let root = tempfile::tempdir().unwrap();
        for bucket in ["3", "5"] {
            std::fs::create_dir(root.path().join(bucket)).unwrap();
        }
        touch(&root.path().join("5"), &["5_0.png", "5_1.png"]);
        touch(&root.path().join("3"), &["3_7.png"]);

        let report = renumber(root.path()).unwrap();
        assert_eq!(report.directories, 3);
        assert_eq!(report.renamed, 1);

        assert_eq!(names_in(&root.path().join("5")), vec!["5_0.png", "5_1.png"]);
        assert_eq!(names_in(&root.path().join("3")), vec!["3_0.png"]);
    }

    #[test]
    fn test_renumber_dense_suffixes_per_directory() {
        let root = tempfile::tempdir().unwrap();
        let bucket = root.path().join("8");
        std::fs::create_dir(&bucket).unwrap();
        touch(&bucket, &["8_4.png", "8_17.png", "8_1.png", "8_250.png", "8_3.png"]);

        renumber(root.path()).unwrap();

        let mut indices: Vec<u64> = names_in(&bucket)
            .iter()
            .map(|n| parse_sequential(n).unwrap().1)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_renumber_swaps_without_clobbering() {
        // 1_2 takes the name 1_1 is vacating; contents must follow their file
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), &["1_1.png", "1_2.png"]);

        renumber(root.path()).unwrap();

        assert_eq!(names_in(root.path()), vec!["1_0.png", "1_1.png"]);
        let first = std::fs::read_to_string(root.path().join("1_0.png")).unwrap();
        let second = std::fs::read_to_string(root.path().join("1_1.png")).unwrap();
        assert_eq!(first, "1_1.png");
        assert_eq!(second, "1_2.png");
    }

    #[test]
    fn test_renumber_rerun_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..12).map(|i| format!("2_{}.png", i * 3 + 1)).collect();
        for name in &names {
            std::fs::write(root.path().join(name), b"x").unwrap();
        }

        renumber(root.path()).unwrap();
        let once = names_in(root.path());

        let report = renumber(root.path()).unwrap();
        assert_eq!(report.renamed, 0);
        assert_eq!(report.already_sequential, vec![root.path().to_path_buf()]);
        assert_eq!(names_in(root.path()), once);
    }

    #[test]
    fn test_nested_directories_get_their_own_counter() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("4").join("extra");
        std::fs::create_dir_all(&nested).unwrap();
        touch(&root.path().join("4"), &["4_9.png"]);
        touch(&nested, &["4_5.png", "4_6.png"]);

        renumber(root.path()).unwrap();

        assert_eq!(names_in(&root.path().join("4")), vec!["4_0.png"]);
        assert_eq!(names_in(&nested), vec!["4_0.png", "4_1.png"]);
    }

    #[test]
    fn test_directory_in_the_way_conflicts_before_renaming() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("6_0.png")).unwrap();
        touch(root.path(), &["6_3.png"]);

        let renamer = Renamer::new(RenumberConfig::default());
        let err = renamer.plan_dir(root.path()).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert!(root.path().join("6_3.png").is_file());
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), &[".keep", "9_4.png"]);

        let report = renumber(root.path()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(names_in(root.path()), vec![".keep", "9_0.png"]);
    }

    #[test]
    fn test_plan_dir_is_dry() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), &["0_5.png"]);

        let renamer = Renamer::new(RenumberConfig::default());
        let plans = renamer.plan(root.path()).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].renames[0].to, root.path().join("0_0.png"));
        assert!(root.path().join("0_5.png").is_file());
    }

    #[test]
    fn test_failure_while_parking_aborts_and_next_run_recovers() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), &["4_10.png", "4_3.png", "4_7.png"]);

        let renamer = Renamer::new(RenumberConfig::default());
        let plan = renamer.plan_dir(root.path()).unwrap();
        assert_eq!(plan.renames.len(), 3);
        // The second source disappears between planning and applying
        std::fs::remove_file(root.path().join("4_3.png")).unwrap();

        let err = apply_dir(&plan).unwrap_err();
        assert_eq!(err.kind(), "io");
        let parked = parking_path(&root.path().join("4_10.png"), 0);
        let parked_name = parked.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(names_in(root.path()), vec![parked_name, "4_7.png".to_string()]);

        // The parked file keeps its label, so a rerun folds it back in
        renumber(root.path()).unwrap();
        assert_eq!(names_in(root.path()), vec!["4_0.png", "4_1.png"]);
        let first = std::fs::read_to_string(root.path().join("4_0.png")).unwrap();
        assert_eq!(first, "4_10.png");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_rename_aborts_the_run() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let locked = root.path().join("2");
        std::fs::create_dir(&locked).unwrap();
        touch(root.path(), &["1_5.png"]);
        touch(&locked, &["2_9.png"]);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();
        // Mode bits are not enforced for root
        let check = locked.join(".write-check");
        if std::fs::write(&check, b"").is_ok() {
            std::fs::remove_file(&check).unwrap();
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = renumber(root.path());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "io");
        // The root was renumbered before the locked directory failed
        assert_eq!(names_in(root.path()), vec!["1_0.png"]);
        assert_eq!(names_in(&locked), vec!["2_9.png"]);
    }
}

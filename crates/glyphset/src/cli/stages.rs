//! Single-stage commands: `normalize`, `bucketize`, `renumber`.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Args;
use glyphset_core::{expand_path, Bucketizer, Config, Normalizer, OutputWriter, Renamer};

use super::summary::{create_progress_bar, print_failures, print_summary};

/// Arguments for the `normalize` command.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Directory of labeled source images
    pub source: PathBuf,

    /// Flat output directory (created if missing)
    pub dest: PathBuf,
}

/// Arguments for the `bucketize` command.
#[derive(Args, Debug)]
pub struct BucketizeArgs {
    /// Flat directory to restructure in place
    pub dir: PathBuf,

    /// Print the planned moves as JSON instead of moving anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `renumber` command.
#[derive(Args, Debug)]
pub struct RenumberArgs {
    /// Root of the tree to renumber in place
    pub dir: PathBuf,

    /// Print the planned renames as JSON instead of renaming anything
    #[arg(long)]
    pub dry_run: bool,

    /// Renumber directories even if they are already sequential
    #[arg(long)]
    pub force: bool,
}

/// Execute the `normalize` command.
pub async fn normalize(args: NormalizeArgs, config: &Config) -> anyhow::Result<()> {
    let source = expand_path(&args.source);
    let dest = expand_path(&args.dest);
    let normalizer = Normalizer::new(config);

    let files = normalizer.discover(&source)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", source);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to normalize", files.len());

    let start = std::time::Instant::now();
    let progress = create_progress_bar(files.len() as u64);
    let report = normalizer
        .normalize_files(&source, &files, &dest, |_, _| progress.inc(1))
        .await?;
    progress.finish_and_clear();

    print_summary(&[report.summary()], start.elapsed());
    print_failures(&report.failures);
    Ok(())
}

/// Execute the `bucketize` command.
pub fn bucketize(args: BucketizeArgs) -> anyhow::Result<()> {
    let dir = expand_path(&args.dir);
    let start = std::time::Instant::now();

    let plan = Bucketizer::plan(&dir)?;
    if args.dry_run {
        let mut writer = OutputWriter::new(
            BufWriter::new(io::stdout()),
            glyphset_core::OutputFormat::Json,
            true,
        );
        writer.write(&plan)?;
        writer.flush()?;
        return Ok(());
    }

    let report = Bucketizer::apply(&plan)?;
    print_summary(&[report.summary()], start.elapsed());
    Ok(())
}

/// Execute the `renumber` command.
pub fn renumber(args: RenumberArgs, config: &Config) -> anyhow::Result<()> {
    let dir = expand_path(&args.dir);
    let mut renumber_config = config.renumber.clone();
    if args.force {
        renumber_config.skip_sequential = false;
    }
    let renamer = Renamer::new(renumber_config);
    let start = std::time::Instant::now();

    if args.dry_run {
        let plans = renamer.plan(&dir)?;
        let mut writer = OutputWriter::new(
            BufWriter::new(io::stdout()),
            glyphset_core::OutputFormat::Json,
            true,
        );
        writer.write_all(&plans)?;
        writer.flush()?;
        return Ok(());
    }

    let report = renamer.renumber(&dir)?;
    print_summary(&[report.summary()], start.elapsed());
    if !report.already_sequential.is_empty() {
        eprintln!(
            "  {} director{} already sequential (use --force to renumber anyway)",
            report.already_sequential.len(),
            if report.already_sequential.len() == 1 {
                "y was"
            } else {
                "ies were"
            }
        );
    }
    Ok(())
}

//! The `glyphset prepare` command: the full normalize → bucketize → renumber run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use glyphset_core::{expand_path, Config, DatasetPipeline, OutputWriter, PipelineError};

use super::summary::{create_progress_bar, print_failures, print_summary};
use super::types::resolve_format;

/// Arguments for the `prepare` command.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Flat directory of labeled source images (read-only)
    pub source: PathBuf,

    /// Destination directory for the prepared tree
    pub dest: PathBuf,

    /// Print where each source file would end up, then stop
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the combined stage report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Execute the prepare command.
pub async fn execute(args: PrepareArgs, config: &Config) -> anyhow::Result<()> {
    let source = expand_path(&args.source);
    let dest = expand_path(&args.dest);
    let pipeline = DatasetPipeline::new(config);

    let files = pipeline.normalizer().discover(&source)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", source);
        return Ok(());
    }
    tracing::info!("Found {} image(s) in {:?}", files.len(), source);

    if args.dry_run {
        let moves = pipeline.preview(&files, &dest);
        let mut writer = OutputWriter::new(
            BufWriter::new(io::stdout()),
            glyphset_core::OutputFormat::JsonLines,
            false,
        );
        writer.write_all(&moves)?;
        writer.flush()?;
        return Ok(());
    }

    let start = std::time::Instant::now();
    let progress = create_progress_bar(files.len() as u64);
    let result = pipeline
        .run_with_progress(&source, &files, &dest, |_, _| progress.inc(1))
        .await;
    progress.finish_and_clear();
    let report = result.map_err(|e| match e {
        PipelineError::Conflict { ref path, .. } if path.parent() == Some(dest.as_path()) => {
            anyhow::anyhow!(
                "{e}\n  The destination holds files from an earlier run. Finish it with \
                 `glyphset bucketize` and `glyphset renumber`, or choose an empty destination."
            )
        }
        other => other.into(),
    })?;

    print_summary(&report.summaries(), start.elapsed());
    print_failures(&report.normalize.failures);

    if let Some(path) = &args.report {
        let path = expand_path(path);
        let mut writer = OutputWriter::new(
            BufWriter::new(File::create(&path)?),
            resolve_format(None, config),
            config.output.pretty,
        );
        writer.write(&report)?;
        writer.flush()?;
        tracing::info!("Report written to {:?}", path);
    }

    io::stderr().flush()?;
    Ok(())
}

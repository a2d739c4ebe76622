//! The `glyphset inspect` command.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use glyphset_core::{expand_path, inspect, Config, OutputWriter};

use super::types::{resolve_format, OutputFormat};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Root of a prepared dataset tree
    pub dir: PathBuf,

    /// Output format (defaults to the config value)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the summary to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with an error if any layout issue is found
    #[arg(long)]
    pub strict: bool,
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let dir = expand_path(&args.dir);
    let summary = inspect(&dir)?;
    let format = resolve_format(args.format, config);

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(expand_path(path))?),
        None => Box::new(io::stdout()),
    };
    let mut writer = OutputWriter::new(BufWriter::new(sink), format, config.output.pretty);
    writer.write(&summary)?;
    writer.flush()?;

    tracing::info!(
        "{} file(s) across {} label(s), {} issue(s)",
        summary.total_files,
        summary.labels.len(),
        summary.issues.len()
    );

    if args.strict && !summary.is_valid() {
        anyhow::bail!(
            "{} does not match the prepared layout ({} issue(s))",
            dir.display(),
            summary.issues.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: PathBuf, output: Option<PathBuf>, strict: bool) -> InspectArgs {
        InspectArgs {
            dir,
            format: Some(OutputFormat::Json),
            output,
            strict,
        }
    }

    #[test]
    fn writes_summary_to_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("3")).unwrap();
        std::fs::write(root.path().join("3").join("3_0.png"), b"x").unwrap();
        let out = tempfile::tempdir().unwrap();
        let report = out.path().join("summary.json");

        execute(
            args(root.path().to_path_buf(), Some(report.clone()), true),
            &Config::default(),
        )
        .unwrap();

        let text = std::fs::read_to_string(report).unwrap();
        assert!(text.contains("\"total_files\": 1"));
    }

    #[test]
    fn strict_fails_on_issues() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("3_0.png"), b"x").unwrap();
        let out = tempfile::tempdir().unwrap();

        let err = execute(
            args(
                root.path().to_path_buf(),
                Some(out.path().join("summary.json")),
                true,
            ),
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("prepared layout"));
    }
}

//! Progress bar and end-of-stage summary printed to stderr.

use glyphset_core::{FileFailure, StageReport};

/// Create a progress bar for the Normalizer.
pub fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("normalizing...");
    pb
}

/// Print a summary table: one row per stage with processed/skipped/failed.
pub fn print_summary(stages: &[StageReport], elapsed: std::time::Duration) {
    eprintln!();
    eprintln!("  ==============================================");
    eprintln!("                      Summary");
    eprintln!("  ==============================================");
    eprintln!(
        "    {:<12} {:>9} {:>9} {:>9}",
        "Stage", "Processed", "Skipped", "Failed"
    );
    for stage in stages {
        eprintln!("{}", summary_row(stage));
    }
    eprintln!("  ----------------------------------------------");
    eprintln!("    Duration:    {:>8.1}s", elapsed.as_secs_f64());
    if let Some(first) = stages.first() {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            eprintln!("    Rate:        {:>8.1} files/sec", first.total() as f64 / secs);
        }
    }
    eprintln!("  ==============================================");
    eprintln!();
}

/// List per-file failures after the summary, if any.
pub fn print_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("  Failed files:");
    for failure in failures {
        eprintln!("    [{}] {}", failure.kind, failure.message);
    }
    eprintln!();
}

fn summary_row(stage: &StageReport) -> String {
    format!(
        "    {:<12} {:>9} {:>9} {:>9}",
        stage.stage, stage.processed, stage.skipped, stage.failed
    )
}

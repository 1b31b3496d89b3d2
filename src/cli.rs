//! Command-line interface module for filemover.
//!
//! This module is the thin adapter between a front end and the organizer:
//! - Configuration loading
//! - Driving an organization run (or a dry run)
//! - Per-entry notices, the completion notice and the summary

use crate::config::Config;
use crate::file_organizer::{FileOrganizer, MoveResult, Organize};
use crate::output::OutputFormatter;
use indicatif::ProgressBar;
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Move every entry of the source into the destination tree.
    Organize {
        /// Suppress per-entry notices and the progress spinner.
        quiet: bool,
    },
    /// Show where every entry would go without changing anything.
    DryRun,
}

/// Counts collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries moved (or planned, for a dry run).
    pub processed: usize,
    /// Entries left in place on purpose: excluded by filters, or category
    /// directories of a destination nested in the source.
    pub skipped: usize,
    /// Entries that could not be moved.
    pub failed: usize,
    /// Processed entries per destination directory label.
    pub category_counts: HashMap<String, usize>,
}

impl RunSummary {
    /// Returns true when no entry failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, result: &MoveResult) {
        match result {
            MoveResult::Moved(op) | MoveResult::Planned(op) => {
                self.processed += 1;
                *self
                    .category_counts
                    .entry(op.category.dir_label())
                    .or_insert(0) += 1;
            }
            MoveResult::Skipped { .. } => self.skipped += 1,
            MoveResult::Failed(_) => self.failed += 1,
        }
    }
}

/// Runs the CLI application with the default configuration lookup.
///
/// # Examples
///
/// ```no_run
/// use filemover::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// let result = run_cli(
///     OrganizeCommand::Organize { quiet: false },
///     Path::new("/home/me/Downloads"),
///     Path::new("/home/me/Sorted"),
/// );
/// match result {
///     Ok(summary) => println!("{} entries organized", summary.processed),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(
    command: OrganizeCommand,
    source: &Path,
    destination: &Path,
) -> Result<RunSummary, String> {
    run_cli_with_config(command, source, destination, None)
}

/// Runs the CLI application with an optional configuration file.
///
/// Per-entry failures are reported and counted in the returned summary; an
/// `Err` means the run never reached the move phase (bad configuration,
/// invalid paths, or a destination tree that could not be created).
pub fn run_cli_with_config(
    command: OrganizeCommand,
    source: &Path,
    destination: &Path,
    config_path: Option<&Path>,
) -> Result<RunSummary, String> {
    let organizer = Config::load(config_path)
        .and_then(Config::into_organizer)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    match command {
        OrganizeCommand::Organize { quiet } => {
            organize_directory(&organizer, source, destination, quiet)
        }
        OrganizeCommand::DryRun => organize_directory_dry_run(&organizer, source, destination),
    }
}

/// Moves every entry of `source` into the category tree under `destination`.
fn organize_directory(
    organizer: &FileOrganizer,
    source: &Path,
    destination: &Path,
    quiet: bool,
) -> Result<RunSummary, String> {
    if !quiet {
        OutputFormatter::info(&format!(
            "Organizing {} into {}",
            source.display(),
            destination.display()
        ));
    }

    let run = organizer
        .organize(source, destination)
        .map_err(|e| e.to_string())?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        OutputFormatter::create_progress_spinner()
    };

    let summary = drain(run, |result| {
        pb.inc(1);
        match result {
            MoveResult::Moved(op) if !quiet => pb.suspend(|| {
                OutputFormatter::success(&format!(
                    "Moved file: {} → {}/",
                    op.file_name(),
                    op.category.dir_label()
                ))
            }),
            MoveResult::Skipped { path, reason } if !quiet => pb.suspend(|| {
                OutputFormatter::warning(&format!("Skipped {}: {}", path.display(), reason))
            }),
            MoveResult::Failed(e) => pb.suspend(|| OutputFormatter::error(&e.to_string())),
            _ => {}
        }
    });
    pb.finish_and_clear();

    info!(
        "Run finished: {} moved, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );

    if !quiet {
        OutputFormatter::summary_table(&summary.category_counts, summary.processed);
    }
    if !summary.is_complete_success() {
        OutputFormatter::warning(&format!(
            "{} {} could not be moved. Please review errors above.",
            summary.failed,
            if summary.failed == 1 { "entry" } else { "entries" }
        ));
    }
    OutputFormatter::success("Completed");

    Ok(summary)
}

/// Shows where every entry of `source` would go, without touching the disk.
fn organize_directory_dry_run(
    organizer: &FileOrganizer,
    source: &Path,
    destination: &Path,
) -> Result<RunSummary, String> {
    OutputFormatter::dry_run_notice(&format!(
        "Analyzing {} for {}",
        source.display(),
        destination.display()
    ));

    let run = organizer
        .plan(source, destination)
        .map_err(|e| e.to_string())?;

    let summary = drain(run, |result| match result {
        MoveResult::Planned(op) => OutputFormatter::plain(&format!(
            " - {}\n   → Would move to {}",
            op.file_name(),
            op.new_path.display()
        )),
        MoveResult::Skipped { path, reason } => {
            OutputFormatter::plain(&format!(" - {} (skipped: {})", path.display(), reason))
        }
        MoveResult::Failed(e) => OutputFormatter::error(&e.to_string()),
        MoveResult::Moved(_) => {}
    });

    if summary.processed == 0 && summary.skipped == 0 && summary.failed == 0 {
        OutputFormatter::plain("No entries found to organize.");
        return Ok(summary);
    }

    OutputFormatter::summary_table(&summary.category_counts, summary.processed);
    OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");

    Ok(summary)
}

/// Consumes a run, reporting each result and tallying the summary.
fn drain(run: Organize<'_>, mut report: impl FnMut(&MoveResult)) -> RunSummary {
    let mut summary = RunSummary::default();
    for result in run {
        report(&result);
        summary.record(&result);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::Category;
    use crate::file_organizer::{Operation, OrganizeError};
    use std::path::PathBuf;

    fn operation(category: Category) -> Operation {
        Operation {
            original_path: PathBuf::from("/src/x"),
            new_path: PathBuf::from("/dst/x"),
            category,
        }
    }

    #[test]
    fn test_summary_records_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&MoveResult::Moved(operation(Category::Audio)));
        summary.record(&MoveResult::Moved(operation(Category::Audio)));
        summary.record(&MoveResult::Planned(operation(Category::PdfLike)));
        summary.record(&MoveResult::Skipped {
            path: PathBuf::from("/src/y"),
            reason: "excluded by filters".to_string(),
        });
        summary.record(&MoveResult::Failed(OrganizeError::InvalidInput {
            path: PathBuf::from("/src/z"),
            reason: "test".to_string(),
        }));

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.category_counts.get("Music"), Some(&2));
        assert_eq!(summary.category_counts.get("Docs/PDFs"), Some(&1));
        assert!(!summary.is_complete_success());
    }

    #[test]
    fn test_run_cli_rejects_missing_config() {
        let result = run_cli_with_config(
            OrganizeCommand::DryRun,
            Path::new("/src"),
            Path::new("/dst"),
            Some(Path::new("/non/existent/filemover.toml")),
        );
        let error = result.expect_err("Expected configuration error");
        assert!(error.contains("configuration"));
    }
}

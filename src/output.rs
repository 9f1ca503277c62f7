//! Output formatting and styling module.
//!
//! Everything the command line shows goes through here: colored status lines,
//! the progress bar driven by [`ConsoleListener`], and the summary tables.

use crate::events::OrganizeListener;
use crate::file_category::Category;
use crate::file_organizer::{FileFailure, MoveRecord, OrganizeReport, PlannedMove};
use crate::undo::{History, UndoReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` file operations.
    ///
    /// ```no_run
    /// use file_sorter::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of files per category with a total row.
    pub fn summary_table(category_counts: &BTreeMap<Category, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|c| c.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints the result of an organize run.
    ///
    /// Each failure gets its own error line, followed by the per-category
    /// summary table and a closing success or warning line.
    ///
    /// # Arguments
    ///
    /// * `report` - The report returned by `FileOrganizer::organize`
    pub fn organize_report(report: &OrganizeReport) {
        if report.moved_count() == 0 && report.failures.is_empty() {
            Self::info(&format!("No files to organize in {}", report.root.display()));
            return;
        }

        for failure in &report.failures {
            Self::error(&format!(
                "Error moving {}: {}",
                failure.source.display(),
                failure.reason
            ));
        }
        if report.moved_count() > 0 {
            Self::summary_table(&report.category_counts(), report.moved_count());
        }

        if report.is_complete_success() {
            Self::success("Files organized successfully.");
        } else {
            Self::warning(&format!(
                "{} of {} files could not be moved. Please review errors above.",
                report.failures.len(),
                report.failures.len() + report.moved_count()
            ));
        }
        if report.moved_count() > 0 {
            Self::plain("Type 'undo' to move them back.");
        }
    }

    /// Prints the result of undoing one batch, failures first.
    ///
    /// # Arguments
    ///
    /// * `report` - The report carried by `UndoOutcome::Undone`
    pub fn undo_report(report: &UndoReport) {
        for failure in &report.failures {
            Self::error(&format!(
                "Error undoing move {}: {}",
                failure.source.display(),
                failure.reason
            ));
        }
        if report.is_complete_success() {
            Self::success(&format!(
                "Undo complete: restored {} {} in {}",
                report.restored.len(),
                plural(report.restored.len()),
                report.root.display()
            ));
        } else {
            Self::warning(&format!(
                "Undo finished: restored {}, failed {}",
                report.restored.len(),
                report.failures.len()
            ));
        }
    }

    /// Shown when undo is requested with an empty history.
    pub fn nothing_to_undo() {
        Self::info("Nothing to undo.");
    }

    /// Prints a preview: one line per planned move and the summary table.
    ///
    /// # Arguments
    ///
    /// * `root_display` - The folder as the user typed it
    /// * `planned` - Moves returned by `FileOrganizer::plan`
    pub fn plan(root_display: &str, planned: &[PlannedMove]) {
        Self::dry_run_notice(&format!("Analyzing contents of: {}", root_display));
        if planned.is_empty() {
            Self::plain("No files found to organize.");
            return;
        }
        let mut counts = BTreeMap::new();
        for planned_move in planned {
            println!(
                " - {}\n   → Would move to {}",
                planned_move.source.display(),
                planned_move.destination.display()
            );
            *counts.entry(planned_move.category).or_insert(0) += 1;
        }
        Self::summary_table(&counts, planned.len());
        Self::dry_run_notice("No files were modified.");
    }

    pub fn history(history: &History) {
        if history.is_empty() {
            Self::plain("History is empty.");
            return;
        }
        Self::header("HISTORY (newest first)");
        for (i, batch) in history.iter().enumerate() {
            println!(
                "{:>3}. {}  {}  {} {}",
                i + 1,
                batch.created_at.format("%Y-%m-%d %H:%M:%S"),
                batch.root.display(),
                batch.len(),
                plural(batch.len())
            );
        }
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Shows organize and undo progress on the terminal. Per-file errors are
/// left to the final report so they are printed once.
#[derive(Default)]
pub struct ConsoleListener {
    progress: Option<ProgressBar>,
}

impl ConsoleListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&mut self, total: usize) {
        if total > 0 {
            self.progress = Some(OutputFormatter::create_progress_bar(total as u64));
        }
    }

    fn tick(&self, message: String) {
        if let Some(pb) = &self.progress {
            pb.set_message(message);
            pb.inc(1);
        }
    }

    /// Clears the progress bar before the final report is printed.
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
    }
}

impl OrganizeListener for ConsoleListener {
    fn scan_finished(&mut self, total: usize) {
        self.start(total);
    }

    fn file_moved(&mut self, record: &MoveRecord) {
        self.tick(format!("{}", record.category));
    }

    fn file_failed(&mut self, _failure: &FileFailure) {
        self.tick("error".to_string());
    }

    fn undo_started(&mut self, total: usize) {
        self.start(total);
    }

    fn file_restored(&mut self, _record: &MoveRecord) {
        self.tick("restored".to_string());
    }

    fn restore_failed(&mut self, _failure: &FileFailure) {
        self.tick("error".to_string());
    }
}

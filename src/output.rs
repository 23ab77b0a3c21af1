//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the progress bar shown while moving, the per-category file report and the
//! summary table.

use crate::duplicates::ResolvedName;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Indentation of file names under a category heading.
const REPORT_INDENT: usize = 8;

/// Anything listed by name in a category report.
pub trait ReportEntry {
    fn report_name(&self) -> String;
}

impl ReportEntry for PathBuf {
    fn report_name(&self) -> String {
        crate::classifier::display_name(self)
    }
}

impl ReportEntry for ResolvedName {
    fn report_name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }
}

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Directory sorted!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` file moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Formats the files of every non-empty category, one name per line.
    ///
    /// # Example
    ///
    /// ```
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    /// use std::path::PathBuf;
    ///
    /// let mut table = BTreeMap::new();
    /// table.insert("images".to_string(), vec![PathBuf::from("/in/photo.jpg")]);
    /// table.insert("video".to_string(), Vec::<PathBuf>::new());
    ///
    /// assert_eq!(
    ///     OutputFormatter::category_report(&table),
    ///     "Files from 'images' category:\n        photo.jpg\n\n"
    /// );
    /// ```
    pub fn category_report<T: ReportEntry>(table: &BTreeMap<String, Vec<T>>) -> String {
        let mut report = String::new();
        for (category, files) in table.iter().filter(|(_, files)| !files.is_empty()) {
            let _ = writeln!(report, "Files from '{}' category:", category);
            for file in files {
                let _ = writeln!(
                    report,
                    "{:indent$}{}",
                    "",
                    file.report_name(),
                    indent = REPORT_INDENT
                );
            }
            report.push('\n');
        }
        report
    }

    /// Prints [`category_report`](Self::category_report) to stdout.
    pub fn print_category_report<T: ReportEntry>(table: &BTreeMap<String, Vec<T>>) {
        print!("{}", Self::category_report(table));
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // "Category"

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural_files(**count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural_files(total_files),
            width = max_category_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural_files(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

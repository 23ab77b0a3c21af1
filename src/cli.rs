//! Command-line interface module for dirsort.
//!
//! This module ties the pipeline together:
//! - Root validation and configuration
//! - Classification, duplicate resolution and moving
//! - Empty directory pruning
//! - Reporting in normal, dry-run and classify-only modes

use crate::classifier::{ClassificationTable, Classifier};
use crate::config::{CompiledConfig, SortConfig};
use crate::duplicates::{DuplicateResolver, ResolutionTable};
use crate::file_organizer::{FileOrganizer, MoveReport, OrganizeResult, validate_root};
use crate::output::OutputFormatter;
use crate::pruner::{PruneReport, prune_empty_dirs};
use std::path::Path;
use tracing::info;

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Sort the directory.
    Organize {
        /// If true, only show what would happen.
        dry_run: bool,
    },
    /// Only classify and list files per category.
    Classify,
}

/// Everything a sorting run produced.
#[derive(Debug)]
pub struct SortReport {
    pub classification: ClassificationTable,
    pub resolution: ResolutionTable,
    /// `None` for dry runs.
    pub moves: Option<MoveReport>,
    /// `None` for dry runs.
    pub pruned: Option<PruneReport>,
}

impl SortReport {
    pub fn classified_count(&self) -> usize {
        self.classification.values().map(Vec::len).sum()
    }
}

/// Runs the pipeline on `root`: classify, resolve duplicates, move, prune.
///
/// With `dry_run` the filesystem is left untouched and only the classification and
/// resolution are returned.
///
/// # Errors
///
/// Returns `OrganizeError::InvalidRoot` before doing anything if `root` is not a
/// directory. Individual move failures do not fail the run; they are listed in
/// the report.
pub fn sort_directory(
    root: &Path,
    config: &CompiledConfig,
    dry_run: bool,
) -> OrganizeResult<SortReport> {
    validate_root(root)?;

    let classification = Classifier::from_config(config).classify(root)?;
    let resolution = DuplicateResolver::resolve(root, &classification);

    if dry_run {
        return Ok(SortReport {
            classification,
            resolution,
            moves: None,
            pruned: None,
        });
    }

    let moves = FileOrganizer::new(config.workers)
        .with_progress(true)
        .move_all(root, &classification, &resolution)?;
    let pruned = prune_empty_dirs(root);

    Ok(SortReport {
        classification,
        resolution,
        moves: Some(moves),
        pruned: Some(pruned),
    })
}

/// Runs the CLI application with the given command and directory path.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// let result = run_cli(OrganizeCommand::Organize { dry_run: false }, Path::new("/path/to/directory"));
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, None)
}

/// Runs the CLI application, loading configuration from `config_path` or the
/// default locations.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = SortConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?
        .compile()
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    run_with_config(command, dir_path, &config)
}

/// Runs the CLI application with an already compiled configuration.
pub fn run_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config: &CompiledConfig,
) -> Result<(), String> {
    validate_root(dir_path).map_err(|e| e.to_string())?;

    match command {
        OrganizeCommand::Organize { dry_run: false } => sort(dir_path, config),
        OrganizeCommand::Organize { dry_run: true } => sort_dry_run(dir_path, config),
        OrganizeCommand::Classify => classify_only(dir_path, config),
    }
}

fn sort(base_path: &Path, config: &CompiledConfig) -> Result<(), String> {
    OutputFormatter::info(&format!("Sorting contents of: {}", base_path.display()));

    let report = sort_directory(base_path, config, false).map_err(|e| e.to_string())?;

    if report.classification.is_empty() {
        OutputFormatter::info("No files matched any category.");
    } else {
        OutputFormatter::print_category_report(&report.resolution);
    }

    if let Some(moves) = &report.moves {
        for failure in &moves.failed {
            OutputFormatter::warning(&failure.to_string());
        }
        if !moves.moved.is_empty() {
            OutputFormatter::summary_table(&moves.category_counts(), moves.moved.len());
        }
        if moves.is_complete_success() {
            OutputFormatter::success("Sorting complete!");
        } else {
            OutputFormatter::warning(&format!(
                "{} of {} files could not be sorted and were left in place.",
                report.classified_count() - moves.moved.len(),
                report.classified_count()
            ));
        }
    }

    if let Some(pruned) = &report.pruned {
        info!(removed = pruned.removed.len(), "cleanup done");
    }

    Ok(())
}

fn sort_dry_run(base_path: &Path, config: &CompiledConfig) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    let report = sort_directory(base_path, config, true).map_err(|e| e.to_string())?;

    if report.classification.is_empty() {
        OutputFormatter::info("No files matched any category.");
        return Ok(());
    }

    OutputFormatter::print_category_report(&report.resolution);

    OutputFormatter::header("PLANNED MOVES");
    for (category, sources) in &report.classification {
        let destinations = report.resolution.get(category).into_iter().flatten();
        for (source, destination) in sources.iter().zip(destinations) {
            println!(
                " - {} → {}",
                source.display(),
                destination.path().display()
            );
        }
    }

    println!();
    OutputFormatter::dry_run_notice(&format!(
        "{} files would be sorted. No files were modified.",
        report.classified_count()
    ));
    Ok(())
}

fn classify_only(base_path: &Path, config: &CompiledConfig) -> Result<(), String> {
    let classification = Classifier::from_config(config)
        .classify(base_path)
        .map_err(|e| e.to_string())?;

    if classification.is_empty() {
        OutputFormatter::info("No files matched any category.");
    } else {
        OutputFormatter::print_category_report(&classification);
    }
    Ok(())
}

/// Moving classified files into their category directories.
///
/// This module creates the category subdirectories of the sorted root and renames
/// every source file to its resolved destination. Each category is handed to a
/// bounded worker pool and fully joined before the next one starts. A failed move
/// only affects its own file; nothing is rolled back.
use crate::classifier::{ClassificationTable, display_name};
use crate::duplicates::ResolutionTable;
use crate::file_category::CategoryTable;
use crate::output::OutputFormatter;
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Represents a single completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the file before sorting.
    pub original_path: PathBuf,
    /// The new path of the file after sorting.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: String,
}

/// Errors that can occur while sorting a directory.
#[derive(Debug)]
pub enum OrganizeError {
    /// The root directory is missing or is not a directory.
    InvalidRoot { path: PathBuf, source: io::Error },
    /// Failed to create a category directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Source and destination lists of a category differ in length.
    TableMismatch {
        category: String,
        sources: usize,
        destinations: usize,
    },
    /// The worker pool could not be started.
    WorkerPool { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot { path, source } => {
                write!(f, "Invalid root directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::TableMismatch {
                category,
                sources,
                destinations,
            } => {
                write!(
                    f,
                    "Category '{}' has {} sources but {} destinations",
                    category, sources, destinations
                )
            }
            Self::WorkerPool { reason } => {
                write!(f, "Failed to start worker pool: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { source, .. } | Self::DirectoryCreationFailed { source, .. } => {
                Some(source)
            }
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::TableMismatch { .. } | Self::WorkerPool { .. } => None,
        }
    }
}

/// Result type for sorting operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Outcome of moving a whole classification.
#[derive(Debug, Default)]
pub struct MoveReport {
    /// Moves that completed.
    pub moved: Vec<Operation>,
    /// Directory and file failures; the affected files stay where they were.
    pub failed: Vec<OrganizeError>,
}

impl MoveReport {
    /// Returns true if every file reached its destination.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of moved files per category.
    pub fn category_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for operation in &self.moved {
            *counts.entry(operation.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Checks that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> OrganizeResult<()> {
    let metadata = fs::metadata(root).map_err(|e| OrganizeError::InvalidRoot {
        path: root.to_path_buf(),
        source: e,
    })?;

    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidRoot {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(())
}

/// Builds a pool of `workers` threads named `<role>-<index>`; 0 means available
/// parallelism.
pub(crate) fn worker_pool(workers: usize, role: &'static str) -> OrganizeResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |index| format!("{}-{}", role, index))
        .build()
        .map_err(|e| OrganizeError::WorkerPool {
            reason: e.to_string(),
        })
}

/// Moves classified files into category subdirectories.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    workers: usize,
    show_progress: bool,
}

impl FileOrganizer {
    /// Creates an organizer using `workers` threads (0 = available parallelism).
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            show_progress: false,
        }
    }

    /// Shows a progress bar on stderr while moving.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Moves every file of `classification` to its entry in `resolution`.
    ///
    /// Categories are processed one after another; inside a category all files are
    /// moved in parallel and joined before the next category starts.
    ///
    /// # Errors
    ///
    /// Fails before touching the filesystem if `root` is invalid, if the tables are
    /// not index-aligned or if the pool cannot be started. Per-file and
    /// per-directory failures are collected in the returned report instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::{Classifier, CategoryTable, DuplicateResolver, FileOrganizer};
    /// use std::path::Path;
    ///
    /// let root = Path::new("/path/to/downloads");
    /// let categories = CategoryTable::default();
    /// let classification = Classifier::new(&categories).classify(root)?;
    /// let resolution = DuplicateResolver::resolve(root, &classification);
    /// let report = FileOrganizer::new(0).move_all(root, &classification, &resolution)?;
    /// println!("Moved {} files", report.moved.len());
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn move_all(
        &self,
        root: &Path,
        classification: &ClassificationTable,
        resolution: &ResolutionTable,
    ) -> OrganizeResult<MoveReport> {
        validate_root(root)?;
        check_alignment(classification, resolution)?;
        let pool = worker_pool(self.workers, "move")?;

        let total: usize = classification.values().map(Vec::len).sum();
        let progress = if self.show_progress {
            OutputFormatter::create_progress_bar(total as u64)
        } else {
            ProgressBar::hidden()
        };

        let mut report = MoveReport::default();
        for (category, sources) in classification {
            let destinations: Vec<PathBuf> = resolution
                .get(category)
                .into_iter()
                .flatten()
                .map(|resolved| resolved.path())
                .collect();
            self.move_category(
                &pool,
                root,
                category,
                sources,
                &destinations,
                &progress,
                &mut report,
            );
        }
        progress.finish_and_clear();

        info!(
            moved = report.moved.len(),
            failed = report.failed.len(),
            "move finished"
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn move_category(
        &self,
        pool: &ThreadPool,
        root: &Path,
        category: &str,
        sources: &[PathBuf],
        destinations: &[PathBuf],
        progress: &ProgressBar,
        report: &mut MoveReport,
    ) {
        let category_path = CategoryTable::dir_path(root, category);
        if let Err(e) = fs::create_dir_all(&category_path) {
            warn!(category, error = %e, "could not create category directory");
            report.failed.push(OrganizeError::DirectoryCreationFailed {
                path: category_path,
                source: e,
            });
            progress.inc(sources.len() as u64);
            return;
        }

        let outcomes: Vec<OrganizeResult<Operation>> = pool.install(|| {
            sources
                .par_iter()
                .zip(destinations.par_iter())
                .map(|(source, destination)| {
                    let outcome = Self::move_file(source, destination, category);
                    progress.inc(1);
                    outcome
                })
                .collect()
        });

        for outcome in outcomes {
            match outcome {
                Ok(operation) => report.moved.push(operation),
                Err(e) => {
                    warn!(error = %e, "move failed");
                    report.failed.push(e);
                }
            }
        }
    }

    /// Renames `source` to `destination` without overwriting anything.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::FileMoveFailure` if the destination already exists
    /// or the rename fails.
    pub fn move_file(
        source: &Path,
        destination: &Path,
        category: &str,
    ) -> OrganizeResult<Operation> {
        let failure = |source_error| OrganizeError::FileMoveFailure {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_error,
        };

        if fs::symlink_metadata(destination).is_ok() {
            return Err(failure(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            )));
        }

        fs::rename(source, destination).map_err(failure)?;
        debug!(file = %display_name(destination), category, "moved");

        Ok(Operation {
            original_path: source.to_path_buf(),
            new_path: destination.to_path_buf(),
            category: category.to_string(),
        })
    }
}

fn check_alignment(
    classification: &ClassificationTable,
    resolution: &ResolutionTable,
) -> OrganizeResult<()> {
    for (category, sources) in classification {
        let destinations = resolution.get(category).map_or(0, Vec::len);
        if destinations != sources.len() {
            return Err(OrganizeError::TableMismatch {
                category: category.clone(),
                sources: sources.len(),
                destinations,
            });
        }
    }
    Ok(())
}

/// Concurrent classification of a directory tree into categories.
///
/// The coordinator walks the tree and hands every candidate file to a bounded
/// worker pool. Each worker looks up the file's category on its own and sends the
/// result back over a channel; only the coordinator ever touches the resulting
/// table, so no lock is needed. The pool scope doubles as the barrier: `classify`
/// returns only after every dispatched file has been looked at.
use crate::config::{CompiledConfig, CompiledFilters};
use crate::file_category::CategoryTable;
use crate::file_organizer::{OrganizeResult, validate_root, worker_pool};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Category name to the source files classified into it.
///
/// Categories without files never appear as keys.
pub type ClassificationTable = BTreeMap<String, Vec<PathBuf>>;

/// Walks a root directory and assigns files to categories.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    categories: &'a CategoryTable,
    filters: Option<&'a CompiledFilters>,
    workers: usize,
    canonical_order: bool,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier with no filters, a default-sized pool and canonical
    /// ordering.
    pub fn new(categories: &'a CategoryTable) -> Self {
        Self {
            categories,
            filters: None,
            workers: 0,
            canonical_order: true,
        }
    }

    /// Creates a classifier from a compiled configuration.
    pub fn from_config(config: &'a CompiledConfig) -> Self {
        Self::new(&config.categories)
            .with_filters(&config.filters)
            .with_workers(config.workers)
            .with_canonical_order(config.canonical_order)
    }

    pub fn with_filters(mut self, filters: &'a CompiledFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Number of worker threads; 0 means available parallelism.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// When true, each category list is sorted by path once all workers are done.
    /// When false, lists keep the order in which workers reported their files.
    pub fn with_canonical_order(mut self, canonical_order: bool) -> Self {
        self.canonical_order = canonical_order;
        self
    }

    /// Classifies every regular file below `root`.
    ///
    /// Files sitting directly inside `root/<category>` are skipped so that an
    /// already sorted tree is not sorted again. Files whose extension matches no
    /// category are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidRoot` if `root` is missing or not a directory,
    /// or `OrganizeError::WorkerPool` if the pool cannot be started.
    pub fn classify(&self, root: &Path) -> OrganizeResult<ClassificationTable> {
        validate_root(root)?;
        let pool = worker_pool(self.workers, "classify")?;

        let (tx, rx) = mpsc::channel::<(String, PathBuf)>();
        let categories = self.categories;
        let mut dispatched = 0usize;

        pool.scope(|scope| {
            for path in self.candidates(root) {
                dispatched += 1;
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let Some(category) = categories.category_for(&path) else {
                        return;
                    };
                    debug!(file = %display_name(&path), category, "classified");
                    // The receiver outlives the scope, so this cannot fail.
                    let _ = tx.send((category.to_string(), path));
                });
            }
        });
        drop(tx);

        let mut table = ClassificationTable::new();
        for (category, path) in rx {
            table.entry(category).or_default().push(path);
        }

        if self.canonical_order {
            for files in table.values_mut() {
                files.sort();
            }
        }

        info!(
            root = %root.display(),
            dispatched,
            classified = table.values().map(Vec::len).sum::<usize>(),
            categories = table.len(),
            "classification finished"
        );

        Ok(table)
    }

    /// Regular files below `root`, minus those already sorted and those filtered out.
    fn candidates<'r>(&'r self, root: &'r Path) -> impl Iterator<Item = PathBuf> + 'r {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| {
                entry
                    .path()
                    .parent()
                    .is_none_or(|parent| !self.categories.is_category_dir(root, parent))
            })
            .filter(move |entry| {
                self.filters.is_none_or(|filters| {
                    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                    filters.should_include(relative)
                })
            })
            .map(walkdir::DirEntry::into_path)
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

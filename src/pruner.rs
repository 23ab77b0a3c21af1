//! Best-effort removal of directories left empty after sorting.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a pruning pass removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// Directories that were removed, deepest first.
    pub removed: Vec<PathBuf>,
}

/// Removes every empty directory below `root`, depth first.
///
/// A directory is attempted only after all of its subdirectories have been
/// visited, so chains of empty directories disappear in a single pass. Removal
/// failures (still holds files, permission denied) leave the directory in place
/// and are not reported. `root` itself is never removed and symlinked
/// directories are not followed.
pub fn prune_empty_dirs(root: &Path) -> PruneReport {
    let mut report = PruneReport::default();
    prune_children(root, &mut report);
    info!(removed = report.removed.len(), "pruned empty directories");
    report
}

fn prune_children(dir: &Path, report: &mut PruneReport) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        if !is_dir {
            continue;
        }

        let path = entry.path();
        prune_children(&path, report);
        match fs::remove_dir(&path) {
            Ok(()) => {
                debug!(dir = %path.display(), "removed empty directory");
                report.removed.push(path);
            }
            Err(e) => debug!(dir = %path.display(), error = %e, "kept directory"),
        }
    }
}

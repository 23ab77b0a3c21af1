//! dirsort - sort a directory tree into category subfolders
//!
//! This library classifies files by extension, resolves name collisions inside each
//! category with numeric suffixes, moves the files concurrently and prunes the
//! directories the move left empty. Filtering rules and extra categories can be
//! configured via TOML configuration files.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod pruner;

pub use classifier::{ClassificationTable, Classifier};
pub use config::{CompiledConfig, CompiledFilters, ConfigError, SortConfig};
pub use duplicates::{DuplicateResolver, ResolutionTable, ResolvedName};
pub use file_category::CategoryTable;
pub use file_organizer::{FileOrganizer, MoveReport, OrganizeError, OrganizeResult};
pub use pruner::{PruneReport, prune_empty_dirs};

pub use cli::{OrganizeCommand, run_cli};

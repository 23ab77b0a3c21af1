/// Collision-free target names for classified files.
///
/// Within a category every file lands in the same directory, so two sources named
/// `photo.jpg` would collide. The resolver walks each category in the order it was
/// given and, for every file not already renamed, looks for other entries with the
/// same name (ignoring case). Those entries get `"<stem> (<n>)<ext>"` names, with
/// `n` starting at the entry's duplicate count and skipping any number already
/// taken by an existing `"<stem> (<n>)"` sibling.
///
/// Names already present in the category directory take part as fixed occupants:
/// they keep their name and only push incoming files to a numbered one.
///
/// The result depends only on the input order: the first occurrence of a name
/// keeps it, later ones are numbered from 2 upwards. Names are kept as OS strings,
/// so bytes that are not valid UTF-8 survive untouched.
///
/// # Examples
///
/// ```
/// use dirsort::duplicates::DuplicateResolver;
/// use std::path::PathBuf;
///
/// let files = vec![
///     PathBuf::from("/in/a.txt"),
///     PathBuf::from("/in/x/a.txt"),
///     PathBuf::from("/in/y/A.TXT"),
/// ];
/// assert_eq!(
///     DuplicateResolver::resolve_names(&files),
///     vec!["a.txt", "a (2).txt", "a (3).txt"]
/// );
/// ```
use crate::classifier::ClassificationTable;
use crate::file_category::CategoryTable;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static NUMBERED_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ \((\d+)\)$").expect("numbered suffix pattern is valid")
});

/// The destination of one classified file: its category directory plus the
/// collision-free file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub dir: PathBuf,
    pub file_name: OsString,
}

impl ResolvedName {
    /// Full destination path.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Category name to resolved destinations, index-aligned with the
/// [`ClassificationTable`] it was built from.
pub type ResolutionTable = BTreeMap<String, Vec<ResolvedName>>;

/// A file name split the same way for every comparison.
#[derive(Debug)]
struct NameParts {
    full: OsString,
    stem: OsString,
    /// Extension including its leading dot, or empty.
    extension: OsString,
    name_key: Vec<u8>,
    stem_key: Vec<u8>,
}

impl NameParts {
    fn new(full: &OsStr) -> Self {
        let path = Path::new(full);
        let stem = path.file_stem().unwrap_or_default().to_os_string();
        let extension = match path.extension() {
            Some(ext) => {
                let mut dotted = OsString::from(".");
                dotted.push(ext);
                dotted
            }
            None => OsString::new(),
        };
        Self {
            name_key: fold_key(full),
            stem_key: fold_key(&stem),
            full: full.to_os_string(),
            stem,
            extension,
        }
    }

    fn from_path(path: &Path) -> Self {
        Self::new(path.file_name().unwrap_or_default())
    }

    fn numbered(&self, id: u32) -> OsString {
        let mut name = self.stem.clone();
        name.push(format!(" ({})", id));
        name.push(&self.extension);
        name
    }
}

/// Computes collision-free names for classified files.
pub struct DuplicateResolver;

impl DuplicateResolver {
    /// Resolves every category of `table` into `root/<category>/<name>`.
    ///
    /// Entries already in `root/<category>` are read first and reserved. The
    /// returned table has the same keys as `table` and the same number of entries
    /// per key; entry `i` is the destination of source `i`.
    pub fn resolve(root: &Path, table: &ClassificationTable) -> ResolutionTable {
        table
            .iter()
            .map(|(category, files)| {
                let dir = CategoryTable::dir_path(root, category);
                let existing = existing_names(&dir);
                let resolved = Self::resolve_names_in(&existing, files)
                    .into_iter()
                    .map(|file_name| ResolvedName {
                        dir: dir.clone(),
                        file_name,
                    })
                    .collect();
                (category.clone(), resolved)
            })
            .collect()
    }

    /// Resolves the names of one category's files, keeping their order.
    pub fn resolve_names(files: &[PathBuf]) -> Vec<OsString> {
        Self::resolve_names_in(&[], files)
    }

    /// Like [`resolve_names`](Self::resolve_names), with `existing` names already
    /// occupying the destination directory.
    ///
    /// Existing names are never renamed and are not part of the result.
    pub fn resolve_names_in(existing: &[OsString], files: &[PathBuf]) -> Vec<OsString> {
        let fixed = existing.len();
        let originals: Vec<NameParts> = existing
            .iter()
            .map(|name| NameParts::new(name))
            .chain(files.iter().map(|f| NameParts::from_path(f)))
            .collect();
        let mut working: Vec<OsString> = originals.iter().map(|n| n.full.clone()).collect();
        let mut renamed = vec![false; originals.len()];

        for (i, original) in originals.iter().enumerate() {
            if renamed[i] {
                continue;
            }

            let mut used_ids: HashSet<u32> = HashSet::new();
            let mut collisions: Vec<(usize, u32)> = Vec::new();
            let mut duplicates = 1u32;

            for (j, current) in working.iter().enumerate() {
                if i == j {
                    continue;
                }
                if fold_key(current) == original.name_key {
                    if j >= fixed {
                        duplicates += 1;
                        collisions.push((j, duplicates));
                    }
                } else if let Some(id) = numbered_suffix(current, &original.stem_key) {
                    used_ids.insert(id);
                }
            }

            for (j, first_id) in collisions {
                let mut id = first_id;
                while used_ids.contains(&id) {
                    id += 1;
                }
                used_ids.insert(id);

                let target = original.numbered(id);
                debug!(
                    source = %files[j - fixed].display(),
                    target = %target.to_string_lossy(),
                    "renamed duplicate"
                );
                working[j] = target;
                renamed[j] = true;
            }
        }

        working.split_off(fixed)
    }
}

/// Comparison key for a name: the full Unicode case fold when the name is valid
/// UTF-8, its exact bytes otherwise.
fn fold_key(name: &OsStr) -> Vec<u8> {
    match name.to_str() {
        Some(name) => caseless::default_case_fold_str(name).into_bytes(),
        None => name.as_encoded_bytes().to_vec(),
    }
}

/// If `name`'s stem is the stem behind `stem_key` followed by `" (<digits>)"`,
/// returns the number.
fn numbered_suffix(name: &OsStr, stem_key: &[u8]) -> Option<u32> {
    let stem = fold_key(Path::new(name).file_stem()?);
    let rest = std::str::from_utf8(stem.strip_prefix(stem_key)?).ok()?;
    let captures = NUMBERED_SUFFIX.captures(rest)?;
    captures[1].parse().ok()
}

/// Names of the entries already in `dir`, sorted. Missing or unreadable
/// directories have none.
fn existing_names(dir: &Path) -> Vec<OsString> {
    let mut names: Vec<OsString> = fs::read_dir(dir)
        .map(|entries| entries.flatten().map(|entry| entry.file_name()).collect())
        .unwrap_or_default();
    names.sort();
    names
}

/// Category registry mapping file extensions to destination folders.
///
/// A category is a named set of lowercase extensions; the name doubles as the
/// subdirectory of the sorted root that receives the category's files. Lookups are
/// case-insensitive and a file matches at most one category.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::CategoryTable;
/// use std::path::Path;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.extension_to_category("png"), Some("images"));
/// assert_eq!(table.extension_to_category("MP3"), Some("audio"));
/// assert_eq!(table.category_for(Path::new("notes.TXT")), Some("documents"));
/// assert_eq!(table.category_for(Path::new("Makefile")), None);
/// ```
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

const ARCHIVES: &[&str] = &[
    "zip", "gz", "tar", "7z", "rar", "arj", "pkg", "deb", "rpm", "z",
];
const AUDIO: &[&str] = &["mp3", "ogg", "wav", "wma", "amr", "aif", "flac", "cue"];
const DOCUMENTS: &[&str] = &[
    "doc", "docx", "odt", "wpd", "rtf", "txt", "tex", "pdf", "ods", "xls", "xlsx", "xlsm",
    "pptx", "djv", "djvu",
];
const IMAGES: &[&str] = &[
    "jpeg", "png", "jpg", "svg", "bmp", "tif", "tiff", "ai", "gif", "ico", "ps", "psd",
    "webp",
];
const VIDEO: &[&str] = &[
    "avi", "mp4", "mov", "mkv", "m4v", "h264", "h265", "mpg", "mpeg", "rm", "flv", "swf",
    "vob", "webm", "wmv",
];

/// Maps category names to their extension sets and back.
///
/// Built once at startup (defaults plus configured additions) and only read
/// afterwards, so it can be shared by reference across worker threads.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: BTreeMap<String, Vec<String>>,
    extension_map: HashMap<String, String>,
}

impl CategoryTable {
    /// Creates a table with no categories.
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Adds extensions to a category, creating the category if needed.
    ///
    /// Extensions are normalized (leading dot stripped, lowercased). An extension
    /// that already belongs to another category is moved to this one, so every
    /// extension keeps exactly one owner.
    pub fn extend<I, S>(&mut self, category: &str, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories.entry(category.to_string()).or_default();

        for extension in extensions {
            let Some(ext) = normalize_extension(extension.as_ref()) else {
                continue;
            };

            if let Some(previous) = self.extension_map.get(&ext)
                && previous != category
                && let Some(owned) = self.categories.get_mut(previous)
            {
                owned.retain(|e| e != &ext);
            }

            self.extension_map.insert(ext.clone(), category.to_string());
            let owned = self.categories.entry(category.to_string()).or_default();
            if !owned.contains(&ext) {
                owned.push(ext);
            }
        }
    }

    /// Returns the category for an extension, ignoring case and a leading dot.
    pub fn extension_to_category(&self, extension: &str) -> Option<&str> {
        let ext = normalize_extension(extension)?;
        self.extension_map.get(&ext).map(String::as_str)
    }

    /// Returns the category of a file based on its extension.
    ///
    /// Files without an extension never match.
    pub fn category_for(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_string_lossy();
        self.extension_to_category(&ext)
    }

    /// Category names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Extensions registered for a category, in registration order.
    pub fn extensions(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Returns the destination directory of a category under `root`.
    pub fn dir_path(root: &Path, category: &str) -> PathBuf {
        root.join(category)
    }

    /// Returns true if `dir` is one of the category directories of `root`.
    pub fn is_category_dir(&self, root: &Path, dir: &Path) -> bool {
        self.names().any(|name| Self::dir_path(root, name) == dir)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.extend("archives", ARCHIVES);
        table.extend("audio", AUDIO);
        table.extend("documents", DOCUMENTS);
        table.extend("images", IMAGES);
        table.extend("video", VIDEO);
        table
    }
}

/// Lowercases an extension and strips a single leading dot.
fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim();
    let ext = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

use dirsort::cli::{OrganizeCommand, run_cli_with_config, run_with_config, sort_directory};
use dirsort::config::{CompiledConfig, SortConfig};
/// Integration tests for dirsort
///
/// These tests run the whole pipeline against temporary directory trees.
///
/// Test categories:
/// 1. Basic sorting workflows
/// 2. Duplicate names
/// 3. Dry-run and classify-only modes
/// 4. Cleanup of empty directories
/// 5. Configuration
/// 6. Edge cases and error scenarios
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory with helpers to build and inspect a file tree.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and its parent directories) with the given content.
    fn create_file(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file content");
    }

    fn create_files(&self, files: &[&str]) {
        for name in files {
            self.create_file(name, name);
        }
    }

    fn create_subdir(&self, rel_path: &str) {
        fs::create_dir_all(self.path().join(rel_path)).expect("Failed to create subdirectory");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Names of the direct children of a directory.
    fn entries(&self, rel_path: &str) -> BTreeSet<String> {
        fs::read_dir(self.path().join(rel_path))
            .expect("Failed to read directory")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// All files below the root, relative to it.
    fn list_files_recursive(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), &mut files);
        let mut relative: Vec<PathBuf> = files
            .into_iter()
            .map(|p| p.strip_prefix(self.path()).unwrap().to_path_buf())
            .collect();
        relative.sort();
        relative
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    Self::walk_dir(&path, files);
                }
            }
        }
    }

    fn sort(&self) -> Result<(), String> {
        run_with_config(
            OrganizeCommand::Organize { dry_run: false },
            self.path(),
            &CompiledConfig::default(),
        )
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// Test Suite 1: Basic Sorting
// ============================================================================

#[test]
fn test_sort_empty_directory() {
    let fixture = TestFixture::new();

    assert!(fixture.sort().is_ok());
    assert!(fixture.entries("").is_empty());
}

#[test]
fn test_sort_mixed_file_types() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "photo.PNG",
        "clip.mkv",
        "backup.tar.gz",
        "song.flac",
        "report.pdf",
        "downloads/drawing.svg",
    ]);

    assert!(fixture.sort().is_ok());

    assert_eq!(
        fixture.list_files_recursive(),
        vec![
            PathBuf::from("archives/backup.tar.gz"),
            PathBuf::from("audio/song.flac"),
            PathBuf::from("documents/report.pdf"),
            PathBuf::from("images/drawing.svg"),
            PathBuf::from("images/photo.PNG"),
            PathBuf::from("video/clip.mkv"),
        ]
    );
    fixture.assert_not_exists("downloads");
}

#[test]
fn test_end_to_end_scenario() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.jpg", "root photo");
    fixture.create_file("trip/photo.jpg", "trip photo");
    fixture.create_file("notes.txt", "notes");

    assert!(fixture.sort().is_ok());

    assert_eq!(fixture.read("images/photo.jpg"), "root photo");
    assert_eq!(fixture.read("images/photo (2).jpg"), "trip photo");
    assert_eq!(fixture.read("documents/notes.txt"), "notes");
    fixture.assert_not_exists("trip");
    assert_eq!(fixture.entries(""), set(&["documents", "images"]));
}

#[test]
fn test_unknown_files_stay_in_place() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Makefile", "tools/build.rs", "tools/logo.png"]);

    assert!(fixture.sort().is_ok());

    fixture.assert_file_exists("Makefile");
    fixture.assert_file_exists("tools/build.rs");
    fixture.assert_file_exists("images/logo.png");
    assert_eq!(fixture.entries(""), set(&["Makefile", "images", "tools"]));
}

#[test]
fn test_many_files_in_nested_directories() {
    let fixture = TestFixture::new();
    for i in 0..150 {
        let ext = ["png", "txt", "mp3"][i % 3];
        fixture.create_file(&format!("d{}/e{}/file{}.{}", i % 5, i % 4, i, ext), "x");
    }

    let config = CompiledConfig {
        workers: 4,
        ..Default::default()
    };
    let report = sort_directory(fixture.path(), &config, false).expect("Sort failed");

    let moves = report.moves.expect("Moves should be reported");
    assert!(moves.is_complete_success());
    assert_eq!(moves.moved.len(), 150);
    assert_eq!(fixture.entries("images").len(), 50);
    assert_eq!(fixture.entries("documents").len(), 50);
    assert_eq!(fixture.entries("audio").len(), 50);
    assert_eq!(fixture.entries(""), set(&["audio", "documents", "images"]));
}

#[test]
fn test_second_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "x/a.txt", "b.png"]);

    assert!(fixture.sort().is_ok());
    let after_first = fixture.list_files_recursive();

    let report = sort_directory(fixture.path(), &CompiledConfig::default(), false).unwrap();

    assert!(report.classification.is_empty());
    assert_eq!(fixture.list_files_recursive(), after_first);
}

#[test]
fn test_only_classified_categories_are_reported() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.mp3", "c.unknown"]);

    let report = sort_directory(fixture.path(), &CompiledConfig::default(), false).unwrap();

    let categories: Vec<&str> = report.resolution.keys().map(String::as_str).collect();
    assert_eq!(categories, vec!["audio", "documents"]);
    assert_eq!(
        report.moves.unwrap().category_counts().len(),
        2,
        "Only non-empty categories are moved"
    );
    fixture.assert_not_exists("images");
    fixture.assert_not_exists("video");
}

// ============================================================================
// Test Suite 2: Duplicate Names
// ============================================================================

#[test]
fn test_three_duplicates_get_numbered() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "first");
    fixture.create_file("b/a.txt", "second");
    fixture.create_file("c/a.txt", "third");

    assert!(fixture.sort().is_ok());

    assert_eq!(
        fixture.entries("documents"),
        set(&["a.txt", "a (2).txt", "a (3).txt"])
    );
    // Canonical order: the shallowest path sorts first and keeps the plain name.
    assert_eq!(fixture.read("documents/a.txt"), "first");
    assert_eq!(fixture.read("documents/a (2).txt"), "second");
    assert_eq!(fixture.read("documents/a (3).txt"), "third");
}

#[test]
fn test_existing_numbered_name_is_not_reused() {
    let fixture = TestFixture::new();
    fixture.create_file("a (2).txt", "numbered");
    fixture.create_file("a.txt", "plain");
    fixture.create_file("z/a.txt", "duplicate");

    assert!(fixture.sort().is_ok());

    assert_eq!(
        fixture.entries("documents"),
        set(&["a.txt", "a (2).txt", "a (3).txt"])
    );
    assert_eq!(fixture.read("documents/a (2).txt"), "numbered");
    assert_eq!(fixture.read("documents/a (3).txt"), "duplicate");
}

#[test]
fn test_duplicates_differing_in_case() {
    let fixture = TestFixture::new();
    fixture.create_file("Report.PDF", "upper");
    fixture.create_file("x/report.pdf", "lower");

    assert!(fixture.sort().is_ok());

    assert_eq!(
        fixture.entries("documents"),
        set(&["Report.PDF", "Report (2).PDF"])
    );
}

#[test]
fn test_previously_sorted_file_keeps_its_name() {
    let fixture = TestFixture::new();
    fixture.create_file("images/photo.png", "already sorted");
    fixture.create_file("images/photo (2).png", "also sorted");
    fixture.create_file("photo.png", "new");

    assert!(fixture.sort().is_ok());

    assert_eq!(fixture.read("images/photo.png"), "already sorted");
    assert_eq!(fixture.read("images/photo (2).png"), "also sorted");
    assert_eq!(fixture.read("images/photo (3).png"), "new");
    fixture.assert_not_exists("photo.png");
}

#[test]
fn test_sorting_twice_moves_newcomers() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.txt", "first");
    assert!(fixture.sort().is_ok());

    fixture.create_file("inbox/notes.txt", "second");
    assert!(fixture.sort().is_ok());

    assert_eq!(
        fixture.entries("documents"),
        set(&["notes.txt", "notes (2).txt"])
    );
    assert_eq!(fixture.read("documents/notes (2).txt"), "second");
    fixture.assert_not_exists("inbox");
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_name_survives_sorting() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = TestFixture::new();
    let name = OsStr::from_bytes(b"caf\xe9.jpg");
    fs::write(fixture.path().join(name), "bytes").expect("Failed to write file content");

    let report = sort_directory(fixture.path(), &CompiledConfig::default(), false).unwrap();

    assert!(report.moves.unwrap().is_complete_success());
    let sorted: Vec<_> = fs::read_dir(fixture.path().join("images"))
        .expect("Failed to read directory")
        .flatten()
        .map(|e| e.file_name())
        .collect();
    assert_eq!(sorted, vec![name.to_os_string()]);
}

// ============================================================================
// Test Suite 3: Dry-Run and Classify-Only Modes
// ============================================================================

#[test]
fn test_dry_run_doesnt_move_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["photo.png", "nested/report.pdf"]);
    fixture.create_subdir("empty");

    let result = run_with_config(
        OrganizeCommand::Organize { dry_run: true },
        fixture.path(),
        &CompiledConfig::default(),
    );

    assert!(result.is_ok());
    fixture.assert_file_exists("photo.png");
    fixture.assert_file_exists("nested/report.pdf");
    fixture.assert_dir_exists("empty");
    assert_eq!(fixture.entries(""), set(&["empty", "nested", "photo.png"]));
}

#[test]
fn test_classify_only_doesnt_move_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["photo.png", "song.mp3"]);

    let result = run_with_config(
        OrganizeCommand::Classify,
        fixture.path(),
        &CompiledConfig::default(),
    );

    assert!(result.is_ok());
    assert_eq!(fixture.entries(""), set(&["photo.png", "song.mp3"]));
}

#[test]
fn test_dry_run_vs_actual_sort() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b/a.jpg"]);

    let planned = sort_directory(fixture.path(), &CompiledConfig::default(), true).unwrap();
    let planned_paths: Vec<PathBuf> = planned.resolution["images"]
        .iter()
        .map(|r| r.path())
        .collect();

    assert!(fixture.sort().is_ok());

    for path in planned_paths {
        assert!(path.is_file(), "Planned destination missing: {}", path.display());
    }
}

// ============================================================================
// Test Suite 4: Cleanup
// ============================================================================

#[test]
fn test_empty_directory_chain_removed() {
    let fixture = TestFixture::new();
    fixture.create_file("a/b/c/deep.mp4", "video");
    fixture.create_subdir("a/other/empty");

    assert!(fixture.sort().is_ok());

    fixture.assert_file_exists("video/deep.mp4");
    fixture.assert_not_exists("a");
    fixture.assert_dir_exists("");
}

#[test]
fn test_directories_with_leftovers_preserved() {
    let fixture = TestFixture::new();
    fixture.create_file("keep/inner/notes.txt", "notes");
    fixture.create_file("keep/inner/deeper/data.bin", "binary");
    fixture.create_subdir("keep/inner/empty");

    assert!(fixture.sort().is_ok());

    fixture.assert_file_exists("documents/notes.txt");
    fixture.assert_file_exists("keep/inner/deeper/data.bin");
    fixture.assert_not_exists("keep/inner/empty");
    assert_eq!(fixture.entries("keep/inner"), set(&["deeper"]));
}

// ============================================================================
// Test Suite 5: Configuration
// ============================================================================

#[test]
fn test_config_file_adds_category_and_filters() {
    let fixture = TestFixture::new();
    let config_dir = TempDir::new().expect("Failed to create config directory");
    let config_path = config_dir.path().join("dirsort.toml");
    fs::write(
        &config_path,
        r#"
        [sort]
        workers = 2

        [categories]
        ebooks = ["epub"]

        [filters.exclude]
        patterns = ["keep/**"]
        "#,
    )
    .unwrap();

    fixture.create_files(&["novel.epub", "keep/photo.png", "photo.png"]);

    let result = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        fixture.path(),
        Some(&config_path),
    );

    assert!(result.is_ok(), "{:?}", result);
    fixture.assert_file_exists("ebooks/novel.epub");
    fixture.assert_file_exists("images/photo.png");
    fixture.assert_file_exists("keep/photo.png");
}

#[test]
fn test_invalid_config_aborts_before_mutation() {
    let fixture = TestFixture::new();
    let config_dir = TempDir::new().expect("Failed to create config directory");
    let config_path = config_dir.path().join("dirsort.toml");
    fs::write(&config_path, "[categories]\n\"../escape\" = [\"png\"]\n").unwrap();
    fixture.create_file("photo.png", "x");

    let result = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        fixture.path(),
        Some(&config_path),
    );

    assert!(result.is_err());
    fixture.assert_file_exists("photo.png");
}

#[test]
fn test_arrival_order_still_sorts_everything() {
    let fixture = TestFixture::new();
    for i in 0..10 {
        fixture.create_file(&format!("d{}/same.png", i), &i.to_string());
    }

    let mut config = SortConfig::default();
    config.sort.canonical_order = false;
    let report = sort_directory(fixture.path(), &config.compile().unwrap(), false).unwrap();

    assert!(report.moves.unwrap().is_complete_success());
    let mut expected = vec!["same.png".to_string()];
    expected.extend((2..=10).map(|i| format!("same ({}).png", i)));
    assert_eq!(
        fixture.entries("images"),
        expected.into_iter().collect::<BTreeSet<_>>()
    );
}

// ============================================================================
// Test Suite 6: Edge Cases and Errors
// ============================================================================

#[test]
fn test_missing_root_is_an_error() {
    let result = run_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Path::new("/non/existent/path"),
        &CompiledConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_file_as_root_is_an_error() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.png", "x");

    let result = run_with_config(
        OrganizeCommand::Organize { dry_run: false },
        &fixture.path().join("photo.png"),
        &CompiledConfig::default(),
    );

    assert!(result.is_err());
    fixture.assert_file_exists("photo.png");
    assert_eq!(fixture.entries(""), set(&["photo.png"]));
}

#[test]
fn test_hidden_files_are_sorted_by_default() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".secret.txt", ".cache/thumb.png"]);

    assert!(fixture.sort().is_ok());

    fixture.assert_file_exists("documents/.secret.txt");
    fixture.assert_file_exists("images/thumb.png");
    fixture.assert_not_exists(".cache");
}

#[cfg(unix)]
#[test]
fn test_symlinked_files_are_not_moved() {
    let fixture = TestFixture::new();
    let outside = TempDir::new().expect("Failed to create temp directory");
    fs::write(outside.path().join("target.png"), "x").unwrap();
    std::os::unix::fs::symlink(
        outside.path().join("target.png"),
        fixture.path().join("link.png"),
    )
    .unwrap();

    assert!(fixture.sort().is_ok());

    assert!(fixture.path().join("link.png").symlink_metadata().is_ok());
    fixture.assert_not_exists("images");
}

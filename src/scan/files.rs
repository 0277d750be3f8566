//! Source file discovery.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::analysis::get_frontend;
use crate::error::AnalysisError;

/// Directory names never descended into (below the root).
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "testdata"];

/// Options controlling which files a scan picks up.
pub struct FileFilter<'a> {
    pub include_test_files: bool,
    pub excluded: &'a GlobSet,
}

/// Path of `path` relative to `root`, with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = if rel.as_os_str().is_empty() {
        // The root itself is a file.
        Path::new(path.file_name().unwrap_or(path.as_os_str()))
    } else {
        rel
    };
    rel.to_string_lossy().replace('\\', "/")
}

/// Recursively collect analyzable source files under `root`, sorted by path.
pub fn collect_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories
            if name.starts_with('.') {
                return false;
            }
            !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry.map_err(|source| AnalysisError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let Some(frontend) = get_frontend(ext) else {
            continue;
        };

        // Skip test files unless explicitly included
        if !filter.include_test_files && frontend.is_test_file(path) {
            continue;
        }

        if filter.excluded.is_match(relative_path(root, path)) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|f| relative_path(root, f)).collect()
    }

    #[test]
    fn test_collects_go_files_and_skips_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go");
        write(dir.path(), "pkg/util.go");
        write(dir.path(), "pkg/util_test.go");
        write(dir.path(), "vendor/lib/lib.go");
        write(dir.path(), "testdata/fixture.go");
        write(dir.path(), ".git/hooks/hook.go");
        write(dir.path(), "README.md");

        let excluded = GlobSet::empty();
        let files = collect_files(
            dir.path(),
            &FileFilter {
                include_test_files: false,
                excluded: &excluded,
            },
        )
        .unwrap();

        assert_eq!(names(dir.path(), &files), vec!["main.go", "pkg/util.go"]);
    }

    #[test]
    fn test_include_tests_and_exclusions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go");
        write(dir.path(), "main_test.go");
        write(dir.path(), "gen/api.go");

        let mut builder = globset::GlobSetBuilder::new();
        builder.add(globset::Glob::new("gen/**").unwrap());
        let excluded = builder.build().unwrap();

        let files = collect_files(
            dir.path(),
            &FileFilter {
                include_test_files: true,
                excluded: &excluded,
            },
        )
        .unwrap();

        assert_eq!(names(dir.path(), &files), vec!["main.go", "main_test.go"]);
    }

    #[test]
    fn test_hidden_root_is_still_scanned() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(".hidden-root");
        write(&root, "main.go");

        let excluded = GlobSet::empty();
        let files = collect_files(
            &root,
            &FileFilter {
                include_test_files: false,
                excluded: &excluded,
            },
        )
        .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_root_is_walk_error() {
        let dir = TempDir::new().unwrap();
        let excluded = GlobSet::empty();
        let err = collect_files(
            &dir.path().join("nope"),
            &FileFilter {
                include_test_files: false,
                excluded: &excluded,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Walk { .. }));
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/src/project");
        assert_eq!(relative_path(root, Path::new("/src/project/a/b.go")), "a/b.go");
        assert_eq!(relative_path(Path::new("/src/x.go"), Path::new("/src/x.go")), "x.go");
    }
}

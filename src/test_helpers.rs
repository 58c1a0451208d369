//! Shared test utilities.
//!
//! Fixture builders that lay out a content root in a temp directory, plus
//! assertions over what ended up in its cache directories.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch_source(tmp.path(), "/uploads/dawn.jpg");
//! // ... resolve ...
//! assert_eq!(cache_file_count(tmp.path()), 2);
//! ```

use std::path::{Path, PathBuf};

/// Disk path of a site-relative URL below `root`, parents created.
fn fixture_path(root: &Path, url: &str) -> PathBuf {
    let path = root.join(url.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    path
}

/// Create a placeholder source file. Its content is never decoded.
pub fn touch_source(root: &Path, url: &str) -> PathBuf {
    let path = fixture_path(root, url);
    std::fs::write(&path, b"placeholder").unwrap();
    path
}

/// Count every file below `root` that sits in a directory named `cache`.
pub fn cache_file_count(root: &Path) -> usize {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|n| n == "cache")
        })
        .count()
}

#[test]
fn cache_file_count_only_counts_cache_dirs() {
    let tmp = tempfile::TempDir::new().unwrap();
    touch_source(tmp.path(), "/a/b.jpg");
    touch_source(tmp.path(), "/a/cache/k.jpg");
    touch_source(tmp.path(), "/cache/k.jpg.webp");
    assert_eq!(cache_file_count(tmp.path()), 2);
}

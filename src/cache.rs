//! Cache keys and the on-disk layout of resized images.
//!
//! Every request tuple `(basename, width, height, policy, quality)` maps to
//! one deterministic [`CacheKey`]. Cache files live next to the source image:
//!
//! ```text
//! uploads/2020/01/
//! ├── dawn.jpg                                   # source
//! └── cache/
//!     ├── 3f0c…e1.jpg                            # primary: <key><ext>
//!     └── 3f0c…e1.jpg.webp                       # alternate: primary + ".webp"
//! ```
//!
//! # Design
//!
//! ## Cache keys
//!
//! The key is the first 128 bits of a SHA-256 over the request fields, hex
//! encoded (32 characters). The basename is length-prefixed and the numeric
//! fields are fixed width, so two distinct tuples never share a hash input
//! (`"a.jpg", 1, 23` and `"a.jpg", 12, 3` stay apart). No time or random
//! input goes in, so keys are stable across restarts.
//!
//! ## Lifecycle
//!
//! Entries are created lazily on the first request for a key, never updated
//! in place and never deleted here. A changed request produces a new key and
//! therefore a new file. [`CacheSurvey`] reports what has accumulated.

use crate::imaging::{ALT_EXTENSION, ResizePolicy, TargetSpec};
use crate::paths::SiteUrl;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Length of a cache key in hex characters.
pub const KEY_LEN: usize = 32;

/// Deterministic fingerprint of one resize request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(basename: &str, target: &TargetSpec) -> Self {
        Self::from_parts(
            basename,
            target.width,
            target.height,
            target.policy,
            target.quality.value(),
        )
    }

    pub fn from_parts(
        basename: &str,
        width: u32,
        height: u32,
        policy: ResizePolicy,
        quality: u32,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"resize\0");
        hasher.update((basename.len() as u64).to_le_bytes());
        hasher.update(basename.as_bytes());
        hasher.update(width.to_le_bytes());
        hasher.update(height.to_le_bytes());
        hasher.update(policy.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(quality.to_le_bytes());
        let hex = format!("{:x}", hasher.finalize());
        Self(hex[..KEY_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Files and URLs of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Cache directory on disk (`<source-dir>/<dir_name>`).
    pub dir: PathBuf,
    pub primary_file: PathBuf,
    pub alt_file: PathBuf,
    pub primary_url: String,
    pub alt_url: String,
}

impl CachePaths {
    /// Derive the cache layout for `url` under `root`.
    ///
    /// The primary file keeps the (lowercased) source extension; the
    /// alternate appends `.webp` to the primary name.
    pub fn new(root: &Path, url: &SiteUrl, key: &CacheKey, dir_name: &str) -> Self {
        let extension = url.extension().unwrap_or_default();
        let file_name = format!("{}{}", key, extension);
        let alt_name = format!("{}.{}", file_name, ALT_EXTENSION);

        let dir = url.disk_dir(root).join(dir_name);
        let url_dir = format!("{}{}/", url.dir(), dir_name);

        Self {
            primary_file: dir.join(&file_name),
            alt_file: dir.join(&alt_name),
            primary_url: format!("{}{}", url_dir, file_name),
            alt_url: format!("{}{}", url_dir, alt_name),
            dir,
        }
    }
}

/// Tally of resolution outcomes, e.g. for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub alternate: u32,
    pub resized: u32,
    pub generated: u32,
    pub fallback: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.alternate + self.resized + self.generated + self.fallback
    }

    /// Combine two tallies (used to reduce parallel batch results).
    pub fn merge(self, other: Self) -> Self {
        Self {
            alternate: self.alternate + other.alternate,
            resized: self.resized + other.resized,
            generated: self.generated + other.generated,
            fallback: self.fallback + other.fallback,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hits = self.alternate + self.resized;
        if hits > 0 {
            write!(
                f,
                "{} cached ({} webp), {} generated, {} original ({} total)",
                hits,
                self.alternate,
                self.generated,
                self.fallback,
                self.total()
            )
        } else {
            write!(
                f,
                "{} generated, {} original",
                self.generated, self.fallback
            )
        }
    }
}

/// Summary of cache files found under a content root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheSurvey {
    pub directories: u32,
    pub primary_files: u32,
    pub alt_files: u32,
    pub bytes: u64,
}

fn is_key_prefixed(name: &str) -> bool {
    name.len() >= KEY_LEN
        && name.is_char_boundary(KEY_LEN)
        && name[..KEY_LEN].bytes().all(|b| b.is_ascii_hexdigit())
}

impl CacheSurvey {
    /// Walk `root` and count cache files in every directory named `dir_name`.
    ///
    /// Files that do not start with a cache key are ignored. Unreadable
    /// entries are skipped.
    pub fn scan(root: &Path, dir_name: &str) -> Self {
        let mut survey = Self::default();
        let alt_suffix = format!(".{}", ALT_EXTENSION);

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                if entry.depth() > 0 && entry.file_name() == dir_name {
                    survey.directories += 1;
                }
                continue;
            }

            let in_cache_dir = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|n| n == dir_name);
            let name = entry.file_name().to_string_lossy();
            if !in_cache_dir || !is_key_prefixed(&name) {
                continue;
            }

            if name.ends_with(&alt_suffix) {
                survey.alt_files += 1;
            } else {
                survey.primary_files += 1;
            }
            survey.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }

        survey
    }
}

impl fmt::Display for CacheSurvey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resized, {} webp in {} cache directories ({} bytes)",
            self.primary_files, self.alt_files, self.directories, self.bytes
        )
    }
}

//! Site-relative image URLs and where they live on disk.
//!
//! Requests carry the URL an image is published under, e.g.
//! `https://example.com/uploads/2020/01/dawn.jpg`. After the configured site
//! origin is stripped, the remaining site-relative URL maps 1:1 onto a file
//! below the content root:
//!
//! ```text
//! URL:   /uploads/2020/01/dawn.jpg
//! disk:  <root>/uploads/2020/01/dawn.jpg
//! ```
//!
//! [`SiteUrl`] splits such a URL into the directory, basename and extension
//! the cache layout is derived from.

use std::path::{Path, PathBuf};

/// A site-relative image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    url: String,
    /// Index where the basename starts.
    split: usize,
}

impl SiteUrl {
    /// Parse an incoming URL, stripping `site_url` when it is a prefix.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// ```
    /// use resize_cache::paths::SiteUrl;
    ///
    /// let url = SiteUrl::parse(" https://example.com/uploads/dawn.JPG ", "https://example.com/");
    /// assert_eq!(url.as_str(), "/uploads/dawn.JPG");
    /// assert_eq!(url.dir(), "/uploads/");
    /// assert_eq!(url.basename(), "dawn.JPG");
    /// assert_eq!(url.extension().as_deref(), Some(".jpg"));
    /// ```
    pub fn parse(raw: &str, site_url: &str) -> Self {
        let raw = raw.trim();
        let site = site_url.trim().trim_end_matches('/');
        let url = if site.is_empty() {
            raw
        } else {
            raw.strip_prefix(site).unwrap_or(raw)
        };
        let split = url.rfind('/').map(|i| i + 1).unwrap_or(0);
        Self {
            url: url.to_string(),
            split,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Directory part, including the trailing `/` (empty for a bare filename).
    pub fn dir(&self) -> &str {
        &self.url[..self.split]
    }

    /// Final path segment.
    pub fn basename(&self) -> &str {
        &self.url[self.split..]
    }

    /// Lowercased extension of the basename, including the leading dot.
    pub fn extension(&self) -> Option<String> {
        let base = self.basename();
        base.rfind('.').map(|i| base[i..].to_ascii_lowercase())
    }

    /// `false` for URLs that could resolve outside the content root or have
    /// no file name.
    pub fn is_safe(&self) -> bool {
        !self.basename().is_empty()
            && !self.url.contains('\\')
            && !self.url.split('/').any(|segment| segment == "..")
    }

    /// Path of the source image below `root`.
    pub fn disk_path(&self, root: &Path) -> PathBuf {
        root.join(self.url.trim_start_matches('/'))
    }

    /// Path of the directory holding the source image below `root`.
    pub fn disk_dir(&self, root: &Path) -> PathBuf {
        root.join(self.dir().trim_start_matches('/'))
    }
}

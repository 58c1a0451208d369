//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` and a
//! `print_*` wrapper that writes to stdout. Format functions are pure.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! /uploads/dawn.jpg 100x100 auto q80
//!     → /uploads/cache/d3c858b872f917c35e72f963fa44d1a0.jpg (cached)
//! ```
//!
//! Batch runs prefix each request with its 1-based position (`001 /uploads/…`).
//!
//! ## Key
//!
//! ```text
//! Key: d3c858b872f917c35e72f963fa44d1a0
//! Primary: /uploads/cache/d3c858b872f917c35e72f963fa44d1a0.jpg
//!     File: site/uploads/cache/d3c858b872f917c35e72f963fa44d1a0.jpg (missing)
//! Alternate: /uploads/cache/d3c858b872f917c35e72f963fa44d1a0.jpg.webp
//!     File: site/uploads/cache/d3c858b872f917c35e72f963fa44d1a0.jpg.webp (missing)
//! ```

use crate::cache::{CacheKey, CachePaths};
use crate::imaging::TargetSpec;
use crate::resolve::{Outcome, Resolution};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Alternate => "webp".to_string(),
        Outcome::Resized => "cached".to_string(),
        Outcome::Generated => "generated".to_string(),
        Outcome::Original(reason) => format!("original: {}", reason),
    }
}

fn request_line(url: &str, target: &TargetSpec) -> String {
    format!(
        "{} {}x{} {} q{}",
        url,
        target.width,
        target.height,
        target.policy,
        target.quality.value()
    )
}

/// Format one resolved request, optionally numbered.
pub fn format_resolution(
    index: Option<usize>,
    url: &str,
    target: &TargetSpec,
    resolution: &Resolution,
) -> Vec<String> {
    let header = match index {
        Some(i) => format!("{} {}", format_index(i), request_line(url, target)),
        None => request_line(url, target),
    };
    vec![
        header,
        format!(
            "    → {} ({})",
            resolution.url,
            outcome_label(&resolution.outcome)
        ),
    ]
}

pub fn print_resolution(index: Option<usize>, url: &str, target: &TargetSpec, resolution: &Resolution) {
    for line in format_resolution(index, url, target, resolution) {
        println!("{}", line);
    }
}

fn file_line(path: &Path) -> String {
    let state = if path.exists() { "present" } else { "missing" };
    format!("    File: {} ({})", path.display(), state)
}

/// Format the cache key and layout for a request.
///
/// `plan` is `None` when the request would never be cached.
pub fn format_key(url: &str, plan: Option<&(CacheKey, CachePaths)>) -> Vec<String> {
    let Some((key, paths)) = plan else {
        return vec![format!("{}: not cacheable, served as-is", url)];
    };
    vec![
        format!("Key: {}", key),
        format!("Primary: {}", paths.primary_url),
        file_line(&paths.primary_file),
        format!("Alternate: {}", paths.alt_url),
        file_line(&paths.alt_file),
    ]
}

pub fn print_key(url: &str, plan: Option<&(CacheKey, CachePaths)>) {
    for line in format_key(url, plan) {
        println!("{}", line);
    }
}

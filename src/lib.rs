//! # resize-cache
//!
//! On-demand image resizing with a persistent disk cache. Given the URL of a
//! JPEG, PNG or GIF below a content root and a target box, it answers with the
//! URL that should be served: a cached resize, a cached WebP alternate, or the
//! original image.
//!
//! # Request Flow
//!
//! ```text
//! URL + size + policy + quality + client hints
//!   │
//!   ├─ degenerate / unsafe ──────────────────────→ original URL
//!   ├─ WebP client and <key>.<ext>.webp exists ──→ alternate URL
//!   ├─ <key>.<ext> exists ───────────────────────→ resized URL
//!   └─ decode → geometry → render → encode ──────→ original URL
//!                                                  (cache warm for next time)
//! ```
//!
//! The first request for a size is served the original while the cache entry
//! is written; later requests get the resized file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension calculations, rendering, and the `image`-crate codec backend |
//! | [`cache`] | Cache keys, cache file layout, outcome tallies, on-disk survey |
//! | [`paths`] | Site-relative URL parsing and mapping to the content root |
//! | [`negotiate`] | `Accept` / `User-Agent` capability signals for the WebP alternate |
//! | [`resolve`] | The orchestrator that picks the URL to serve |
//! | [`config`] | `resize.toml` loading, validation, and stock defaults |
//! | [`types`] | Request types read from batch files |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never Fail the Page
//!
//! Resizing is an optimization. Every failure path (unknown format, corrupt
//! source, full disk) degrades to the original URL and a log line, so callers
//! never need error handling around [`resolve::Resolver::resolve`].
//!
//! ## Files Are the Index
//!
//! There is no database or manifest. A cache entry exists exactly when its
//! file exists, and the file name is a hash of the request, so a lookup is one
//! `stat`. Entries are never rewritten; a different request is a different key.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate only. No system
//! libraries, no ImageMagick.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod negotiate;
pub mod output;
pub mod paths;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

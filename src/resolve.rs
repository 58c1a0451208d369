//! Cache orchestration: decide which URL a request is answered with.
//!
//! For every request the [`Resolver`] picks one of three URLs:
//!
//! ```text
//! 1. degenerate / unsafe request           → original URL
//! 2. client takes WebP and .webp exists    → alternate URL
//! 3. primary cache file exists             → resized URL
//! 4. otherwise decode → render → encode    → original URL (cache warm for next time)
//! ```
//!
//! The alternate check comes first, so a capable client is served the WebP
//! copy without looking at the primary file at all.
//!
//! ## Failure policy
//!
//! Nothing here returns an error. Every failure (unsupported extension,
//! unreadable source, failed encode, I/O) degrades to the original URL and
//! is reported through [`Outcome::Original`] and a `warn!` log line.
//!
//! ## Concurrency
//!
//! `Resolver` holds no mutable state and is `Sync`. Concurrent misses on the
//! same key both render and both write the same paths; the last writer wins.
//! There is no locking or single-flight.

use crate::cache::{CacheKey, CachePaths, CacheStats};
use crate::config::ResizeConfig;
use crate::imaging::{
    BackendError, ImageBackend, Quality, ResizePolicy, SourceFormat, TargetSpec, render,
};
use crate::negotiate::ClientHints;
use crate::paths::SiteUrl;
use crate::types::ResizeRequest;
use log::{debug, info, warn};
use std::fmt;
use std::path::PathBuf;

/// Why a request was answered with the original URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Zero or negative requested size, an unknown policy, or a canvas over
    /// the pixel budget.
    Degenerate,
    /// URL escapes the content root or has no file name.
    InvalidUrl,
    /// Extension is not JPEG, PNG or GIF.
    UnsupportedFormat,
    /// Source missing, unreadable or corrupt.
    Decode,
    /// Cache directory could not be created.
    Io,
    /// Writing a cache file failed.
    Encode,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FallbackReason::Degenerate => "degenerate request",
            FallbackReason::InvalidUrl => "invalid url",
            FallbackReason::UnsupportedFormat => "unsupported format",
            FallbackReason::Decode => "decode failed",
            FallbackReason::Io => "cache directory unavailable",
            FallbackReason::Encode => "encode failed",
        };
        f.write_str(text)
    }
}

/// Which artifact the returned URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Cached WebP alternate.
    Alternate,
    /// Cached primary resize.
    Resized,
    /// Cache entry was just created; the original URL is returned this time.
    Generated,
    /// Original URL, nothing was (or could be) cached.
    Original(FallbackReason),
}

/// Answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Site-relative URL to serve.
    pub url: String,
    pub outcome: Outcome,
    /// Cache key, when the request got far enough to compute one.
    pub key: Option<CacheKey>,
}

impl Resolution {
    fn original(url: &SiteUrl, reason: FallbackReason, key: Option<CacheKey>) -> Self {
        Self {
            url: url.as_str().to_string(),
            outcome: Outcome::Original(reason),
            key,
        }
    }

    /// Count this resolution in `stats`.
    pub fn record(&self, stats: &mut CacheStats) {
        match self.outcome {
            Outcome::Alternate => stats.alternate += 1,
            Outcome::Resized => stats.resized += 1,
            Outcome::Generated => stats.generated += 1,
            Outcome::Original(_) => stats.fallback += 1,
        }
    }
}

/// Stateless request resolver over a content root.
pub struct Resolver<B> {
    backend: B,
    root: PathBuf,
    config: ResizeConfig,
}

impl<B: ImageBackend> Resolver<B> {
    pub fn new(backend: B, root: impl Into<PathBuf>, config: ResizeConfig) -> Self {
        Self {
            backend,
            root: root.into(),
            config,
        }
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    /// Compute the cache key and paths for a request without touching disk.
    ///
    /// Returns `None` for requests that would fall back before any cache
    /// lookup (degenerate size, unsafe URL).
    pub fn plan(&self, url: &str, target: &TargetSpec) -> Option<(CacheKey, CachePaths)> {
        let site_url = SiteUrl::parse(url, &self.config.site_url);
        if target.is_degenerate() || !site_url.is_safe() {
            return None;
        }
        let key = CacheKey::new(site_url.basename(), target);
        let paths = CachePaths::new(&self.root, &site_url, &key, &self.config.cache.dir_name);
        Some((key, paths))
    }

    /// Resolve a batch-file request, filling defaults from the config.
    pub fn resolve_request(&self, request: &ResizeRequest, client: ClientHints) -> Resolution {
        let target = request.target(&self.config.defaults);
        self.resolve(&request.url, &target, client)
    }

    /// Pick the URL to serve for `url` resized to `target`.
    pub fn resolve(&self, url: &str, target: &TargetSpec, client: ClientHints) -> Resolution {
        let site_url = SiteUrl::parse(url, &self.config.site_url);

        if target.is_degenerate() {
            warn!(
                "{}: degenerate request {}x{}, serving original",
                site_url.as_str(),
                target.width,
                target.height
            );
            return Resolution::original(&site_url, FallbackReason::Degenerate, None);
        }
        if !site_url.is_safe() {
            warn!("{}: url outside content root, serving original", site_url.as_str());
            return Resolution::original(&site_url, FallbackReason::InvalidUrl, None);
        }

        let key = CacheKey::new(site_url.basename(), target);
        let paths = CachePaths::new(&self.root, &site_url, &key, &self.config.cache.dir_name);

        if client.prefers_alternate() && paths.alt_file.exists() {
            debug!("{}: webp hit {}", site_url.as_str(), paths.alt_url);
            return Resolution {
                url: paths.alt_url,
                outcome: Outcome::Alternate,
                key: Some(key),
            };
        }

        if paths.primary_file.exists() {
            debug!("{}: cache hit {}", site_url.as_str(), paths.primary_url);
            return Resolution {
                url: paths.primary_url,
                outcome: Outcome::Resized,
                key: Some(key),
            };
        }

        match self.generate(&site_url, &paths, target) {
            Ok(()) => {
                info!(
                    "{}: cached {}x{} {} as {}",
                    site_url.as_str(),
                    target.width,
                    target.height,
                    target.policy,
                    paths.primary_url
                );
                Resolution {
                    url: site_url.as_str().to_string(),
                    outcome: Outcome::Generated,
                    key: Some(key),
                }
            }
            Err(reason) => Resolution::original(&site_url, reason, Some(key)),
        }
    }

    /// decode → geometry → render → encode primary (→ encode alternate).
    ///
    /// The cache directory is only created once the source has decoded, so a
    /// failed request leaves nothing behind.
    fn generate(
        &self,
        url: &SiteUrl,
        paths: &CachePaths,
        target: &TargetSpec,
    ) -> Result<(), FallbackReason> {
        let Some(format) = url.extension().as_deref().and_then(SourceFormat::from_extension)
        else {
            debug!("{}: unsupported extension, serving original", url.as_str());
            return Err(FallbackReason::UnsupportedFormat);
        };

        let source_path = url.disk_path(&self.root);
        let output = {
            let source = self.backend.decode(&source_path, format).map_err(|e| {
                warn!("{}: {}", url.as_str(), e);
                FallbackReason::Decode
            })?;
            let dims = target
                .dimensions_for(source.dimensions())
                .and_then(|dims| dims.within_budget(self.config.processing.max_pixels))
                .map_err(|e| {
                    warn!("{}: {}", url.as_str(), e);
                    FallbackReason::Degenerate
                })?;
            render(&source, &dims)
        };

        std::fs::create_dir_all(&paths.dir).map_err(|e| {
            warn!("{}: cannot create {}: {}", url.as_str(), paths.dir.display(), e);
            FallbackReason::Io
        })?;

        let encode_failed = |e: BackendError| {
            warn!("{}: {}", url.as_str(), e);
            FallbackReason::Encode
        };
        self.backend
            .encode(&output, &paths.primary_file, format.primary_output(), target.quality)
            .map_err(encode_failed)?;
        if let Some(alt) = format.alternate_output() {
            self.backend
                .encode(&output, &paths.alt_file, alt, target.quality)
                .map_err(encode_failed)?;
        }
        Ok(())
    }
}

/// String-typed entry point for host integrations.
///
/// Takes the loosely typed values a template or hook would pass. Negative or
/// zero sizes and unknown policy names are degenerate and yield the original
/// URL; quality is clamped to 0–100.
pub fn resize_url<B: ImageBackend>(
    resolver: &Resolver<B>,
    url: &str,
    width: i64,
    height: i64,
    policy: &str,
    quality: i64,
    client: ClientHints,
) -> String {
    let original = || {
        SiteUrl::parse(url, &resolver.config().site_url)
            .as_str()
            .to_string()
    };
    let side = |v: i64| u32::try_from(v).ok().filter(|&v| v > 0);
    let (Some(w), Some(h)) = (side(width), side(height)) else {
        warn!(
            "{}: degenerate request {}x{}, serving original",
            url.trim(),
            width,
            height
        );
        return original();
    };
    let Ok(policy) = policy.parse::<ResizePolicy>() else {
        warn!("{}: unknown policy '{}', serving original", url.trim(), policy);
        return original();
    };
    let quality = Quality::new(quality.clamp(0, 100) as u32);
    resolver
        .resolve(url, &TargetSpec::new(w, h, policy, quality), client)
        .url
}

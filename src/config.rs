//! Resizer configuration module.
//!
//! Handles loading, validating, and merging `resize.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `resize.toml` is read from the content root, or from the path given with
//! `--config`:
//!
//! ```text
//! www/
//! ├── resize.toml
//! └── uploads/
//!     └── 2020/01/
//!         ├── dawn.jpg
//!         └── cache/           # created on demand
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_url = ""                 # Origin stripped from absolute URLs
//!
//! [defaults]
//! policy = "auto"               # exact | portrait | landscape | auto | crop
//! quality = 80                  # JPEG quality (0-100)
//!
//! [cache]
//! dir_name = "cache"            # Cache directory next to each source image
//!
//! [negotiation]
//! accept_token = "image/webp"   # Looked for in Accept (case-sensitive)
//! user_agent_token = "Chrome"   # Looked for in User-Agent (case-insensitive)
//!
//! [processing]
//! max_processes = 4             # Max parallel batch workers (omit for auto = CPU cores)
//! max_pixels = 50000000        # Canvas budget per request; bigger requests get the original
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResizePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the content root.
pub const CONFIG_FILENAME: &str = "resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `resize.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Absolute site origin (e.g. `"https://example.com"`) stripped from
    /// incoming URLs. Empty disables stripping.
    pub site_url: String,
    /// Policy and quality used when a request leaves them out.
    pub defaults: DefaultsConfig,
    /// Cache layout settings.
    pub cache: CacheConfig,
    /// Client capability detection for the WebP alternate.
    pub negotiation: NegotiationConfig,
    /// Batch parallelism and per-request render limits.
    pub processing: ProcessingConfig,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.quality > 100 {
            return Err(ConfigError::Validation(
                "defaults.quality must be 0-100".into(),
            ));
        }
        let dir = self.cache.dir_name.as_str();
        if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "cache.dir_name must be a single, non-empty directory name".into(),
            ));
        }
        if self.negotiation.accept_token.is_empty() {
            return Err(ConfigError::Validation(
                "negotiation.accept_token must not be empty".into(),
            ));
        }
        if self.negotiation.user_agent_token.is_empty() {
            return Err(ConfigError::Validation(
                "negotiation.user_agent_token must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.processing.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "processing.max_pixels must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Request defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Resize policy when none is given.
    pub policy: ResizePolicy,
    /// Encoding quality when none is given (0 = worst, 100 = best).
    pub quality: u32,
}

impl DefaultsConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            policy: ResizePolicy::Auto,
            quality: Quality::default().value(),
        }
    }
}

/// Cache layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Name of the cache directory created next to each source image.
    pub dir_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir_name: "cache".to_string(),
        }
    }
}

/// Substrings that mark a client as able to take the WebP alternate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NegotiationConfig {
    /// Token searched in the `Accept` header, case-sensitive.
    pub accept_token: String,
    /// Token searched in the `User-Agent` header, case-insensitive.
    pub user_agent_token: String,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            accept_token: "image/webp".to_string(),
            user_agent_token: "Chrome".to_string(),
        }
    }
}

/// Default upper bound on the resampling canvas, in pixels.
pub const DEFAULT_MAX_PIXELS: u64 = 50_000_000;

/// Processing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Largest canvas (width × height) a single request may render.
    /// Bigger requests are served the original image.
    pub max_pixels: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: None,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if it exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `resize.toml` from the given content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(root: &Path) -> Result<ResizeConfig, ConfigError> {
    load_config_file(&root.join(CONFIG_FILENAME))
}

/// Load a config from an explicit file path (see [`load_config`]).
pub fn load_config_file(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `resize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# resize-cache configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as resize.toml in the content root, or pass --config.
# Unknown keys will cause an error.

# Absolute site origin stripped from incoming image URLs, e.g.
# "https://example.com". Leave empty if URLs are already site-relative.
site_url = ""

# ---------------------------------------------------------------------------
# Request defaults
# ---------------------------------------------------------------------------
[defaults]
# How output dimensions are derived from the requested box:
#   exact     - use width x height as given (may distort)
#   portrait  - height wins, width follows the source aspect ratio
#   landscape - width wins, height follows the source aspect ratio
#   auto      - pick by source orientation
#   crop      - cover the box, then cut the centered region
policy = "auto"

# JPEG encoding quality (0 = worst, 100 = best). Part of the cache key.
quality = 80

# ---------------------------------------------------------------------------
# Cache layout
# ---------------------------------------------------------------------------
[cache]
# Directory created next to each source image to hold resized copies.
dir_name = "cache"

# ---------------------------------------------------------------------------
# WebP negotiation
# ---------------------------------------------------------------------------
[negotiation]
# The WebP copy is served only when the Accept header contains accept_token
# AND the User-Agent contains user_agent_token.
accept_token = "image/webp"
user_agent_token = "Chrome"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for the batch command.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# Largest intermediate canvas (width x height) one request may allocate.
# Requests over the budget are served the original image.
max_pixels = 50000000
"##
}

//! Request types shared between the CLI and the library.

use crate::config::DefaultsConfig;
use crate::imaging::{Quality, ResizePolicy, TargetSpec};
use serde::{Deserialize, Serialize};

/// Width and height used when a request leaves them out.
pub const DEFAULT_SIDE: u32 = 100;

fn default_side() -> u32 {
    DEFAULT_SIDE
}

/// One resize request as read from a batch file.
///
/// ```json
/// { "url": "/uploads/dawn.jpg", "width": 300, "height": 200, "policy": "crop" }
/// ```
///
/// `policy` and `quality` fall back to the configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeRequest {
    pub url: String,
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ResizePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
}

impl ResizeRequest {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
            policy: None,
            quality: None,
        }
    }

    /// Fill in missing fields from `defaults`.
    pub fn target(&self, defaults: &DefaultsConfig) -> TargetSpec {
        TargetSpec::new(
            self.width,
            self.height,
            self.policy.unwrap_or(defaults.policy),
            self.quality.map(Quality::new).unwrap_or_else(|| defaults.quality()),
        )
    }
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the orchestrator in [`resolve`](crate::resolve) (which
//! decides whether an image needs to be produced) and the
//! [`backend`](super::backend) (which does the encode work).
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (0–100, default 80). Clamped on construction.
//! - [`TargetSpec`]: requested width/height, policy and quality for one request.

use super::calculations::{ComputedDimensions, GeometryError, ResizePolicy, resolve_dimensions};
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(self) -> u32 {
        self.0 as u32
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

/// One resize request: target box, policy and encoding quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
    pub policy: ResizePolicy,
    pub quality: Quality,
}

impl TargetSpec {
    pub fn new(width: u32, height: u32, policy: ResizePolicy, quality: Quality) -> Self {
        Self {
            width,
            height,
            policy,
            quality,
        }
    }

    /// `true` when either requested side is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Run the geometry step for a source of the given size.
    pub fn dimensions_for(&self, source: (u32, u32)) -> Result<ComputedDimensions, GeometryError> {
        resolve_dimensions(source, (self.width, self.height), self.policy)
    }
}

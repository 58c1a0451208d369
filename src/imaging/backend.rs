//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations that touch codecs and
//! the filesystem: decode a source file and encode a rendered image to a cache
//! path. Pixel work in between is the pure [`render`](super::render) step.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock.

use super::formats::{OutputFormat, SourceFormat};
use super::params::Quality;
use super::render::OutputImage;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Decoded source pixels. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

/// Trait for image codec backends.
///
/// `Sync` so one backend can serve parallel batch workers.
pub trait ImageBackend: Sync {
    /// Decode the file at `path` as `format`.
    fn decode(&self, path: &Path, format: SourceFormat) -> Result<SourceImage, BackendError>;

    /// Encode `image` to `path` in `format`. `quality` applies to lossy formats only.
    fn encode(
        &self,
        image: &OutputImage,
        path: &Path,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<(), BackendError>;
}

impl<B: ImageBackend + ?Sized> ImageBackend for &B {
    fn decode(&self, path: &Path, format: SourceFormat) -> Result<SourceImage, BackendError> {
        (**self).decode(path, format)
    }

    fn encode(
        &self,
        image: &OutputImage,
        path: &Path,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<(), BackendError> {
        (**self).encode(image, path, format, quality)
    }
}

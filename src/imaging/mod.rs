//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Where |
//! |---|---|
//! | **Geometry** | [`resolve_dimensions`]: policy → canvas + optional crop |
//! | **Decode** | [`ImageBackend::decode`] (JPEG, PNG, GIF) |
//! | **Resample + crop** | [`render`], Catmull-Rom, alpha kept as-is |
//! | **Encode** | [`ImageBackend::encode`] (JPEG, PNG, GIF, lossless WebP) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a request
//! - **Formats**: Which encoders run for which source extension
//! - **Render**: Pure pixel pipeline between decode and encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod formats;
mod params;
pub mod render;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, SourceImage};
pub use calculations::{
    ComputedDimensions, CropRect, GeometryError, PolicyParseError, ResizePolicy,
    resolve_dimensions,
};
pub use formats::{ALT_EXTENSION, OutputFormat, SourceFormat};
pub use params::{Quality, TargetSpec};
pub use render::{OutputImage, render};
pub use rust_backend::RustBackend;

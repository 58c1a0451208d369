//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image::ImageReader` with the format pinned by extension |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (single frame) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! Files and encoders are scoped to each call, so handles are released on
//! every exit path. Output is encoded into a dot-prefixed temp file in the
//! destination directory and renamed over the final name once complete, so a
//! crash or failed encode never leaves a truncated cache entry behind.

use super::backend::{BackendError, ImageBackend, SourceImage};
use super::formats::{OutputFormat, SourceFormat};
use super::params::Quality;
use super::render::OutputImage;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, Frame, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path, format: SourceFormat) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::open(path).map_err(BackendError::Io)?;
    reader.set_format(format.image_format());
    reader.decode().map_err(|e| {
        BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// JPEG has no alpha channel and `JpegEncoder` rejects RGBA input.
fn without_alpha(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img.clone()
    }
}

/// The WebP encoder only takes 8-bit RGB or RGBA.
fn webp_compatible(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

fn write_encoded<W: Write>(
    writer: W,
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let encode_err =
        |e: image::ImageError| BackendError::Encode(format!("{} encode failed: {}", format.name(), e));

    match format {
        OutputFormat::Jpeg => {
            // The JPEG encoder accepts 1-100
            let q = quality.value().max(1) as u8;
            let encoder = JpegEncoder::new_with_quality(writer, q);
            without_alpha(img).write_with_encoder(encoder).map_err(encode_err)
        }
        OutputFormat::Png => img
            .write_with_encoder(PngEncoder::new(writer))
            .map_err(encode_err),
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(writer);
            encoder
                .encode_frame(Frame::new(img.to_rgba8()))
                .map_err(encode_err)
        }
        OutputFormat::WebP => webp_compatible(img)
            .write_with_encoder(WebPEncoder::new_lossless(writer))
            .map_err(encode_err),
    }
}

/// Encode into a temp file beside `path`, then rename it into place.
///
/// Readers of `path` see either the old state or the complete file. On any
/// failure the temp file is dropped and `path` is untouched.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".").suffix(".tmp");
    // tempfile defaults to 0600; cache files must stay readable by the web server
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(BackendError::Io)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_encoded(&mut writer, img, format, quality)?;
        writer.flush().map_err(BackendError::Io)?;
    }

    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path, format: SourceFormat) -> Result<SourceImage, BackendError> {
        load_image(path, format).map(SourceImage::new)
    }

    fn encode(
        &self,
        image: &OutputImage,
        path: &Path,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<(), BackendError> {
        save_image(image.as_dynamic(), path, format, quality)
    }
}

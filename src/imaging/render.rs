//! Resize engine: resample a decoded source onto the computed canvas and,
//! for crop requests, cut the centered box out of it.
//!
//! Pure pixel work, no I/O. The pixel layout of the source is kept: RGBA
//! sources stay RGBA and alpha is resampled as a plain channel, never blended
//! against a background.

use super::backend::SourceImage;
use super::calculations::ComputedDimensions;
use image::DynamicImage;
use image::imageops::FilterType;

/// Bicubic resampling for both down- and upscaling.
pub const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Rendered pixels at the final dimensions, ready for encoding.
#[derive(Debug, Clone)]
pub struct OutputImage {
    image: DynamicImage,
}

impl OutputImage {
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

/// Produce the output image for `dims`.
///
/// The first pass scales the whole source to [`ComputedDimensions::canvas_size`].
/// When a crop is present the second pass copies the crop box 1:1 from that
/// canvas, since the canvas is already at output scale.
pub fn render(source: &SourceImage, dims: &ComputedDimensions) -> OutputImage {
    let (canvas_w, canvas_h) = dims.canvas_size();
    let canvas = source
        .as_dynamic()
        .resize_exact(canvas_w, canvas_h, RESAMPLE_FILTER);

    let image = match dims.crop {
        Some(crop) => {
            let (x, y) = crop.pixel_origin((canvas_w, canvas_h));
            canvas.crop_imm(x, y, crop.width, crop.height)
        }
        None => canvas,
    };

    OutputImage::new(image)
}

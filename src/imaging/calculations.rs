//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! [`resolve_dimensions`] maps a source size, a requested size and a
//! [`ResizePolicy`] to the canvas the source is resampled into, plus an
//! optional centered crop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named rule for deriving output dimensions from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Use the requested size verbatim. May distort.
    Exact,
    /// Height is authoritative, width follows the source aspect ratio.
    Portrait,
    /// Width is authoritative, height follows the source aspect ratio.
    Landscape,
    /// Pick the authoritative dimension from the source orientation.
    #[default]
    Auto,
    /// Scale to cover the requested box, then center-crop to it.
    Crop,
}

impl ResizePolicy {
    pub const ALL: [ResizePolicy; 5] = [
        ResizePolicy::Exact,
        ResizePolicy::Portrait,
        ResizePolicy::Landscape,
        ResizePolicy::Auto,
        ResizePolicy::Crop,
    ];

    /// The lowercase name used in URLs, config files and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            ResizePolicy::Exact => "exact",
            ResizePolicy::Portrait => "portrait",
            ResizePolicy::Landscape => "landscape",
            ResizePolicy::Auto => "auto",
            ResizePolicy::Crop => "crop",
        }
    }
}

impl fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown resize policy '{0}' (expected exact, portrait, landscape, auto or crop)")]
pub struct PolicyParseError(pub String);

impl FromStr for ResizePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizePolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PolicyParseError(s.to_string()))
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("degenerate request: {width}x{height} has a zero dimension")]
    DegenerateRequest { width: u32, height: u32 },
    #[error("degenerate source: {width}x{height} has a zero dimension")]
    DegenerateSource { width: u32, height: u32 },
    #[error("canvas {width}x{height} exceeds the {max_pixels} pixel budget")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
}

/// Centered crop taken from the resampled canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    /// Top-left corner on the canvas (may be fractional).
    pub x: f64,
    pub y: f64,
    /// Final output size, always the requested size.
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Integer origin on a canvas of the given size.
    ///
    /// Rounded to the nearest pixel and clamped so the crop never reads past
    /// the canvas edge.
    pub fn pixel_origin(&self, canvas: (u32, u32)) -> (u32, u32) {
        let max_x = canvas.0.saturating_sub(self.width);
        let max_y = canvas.1.saturating_sub(self.height);
        let x = (self.x.max(0.0).round() as u32).min(max_x);
        let y = (self.y.max(0.0).round() as u32).min(max_y);
        (x, y)
    }
}

/// Result of the geometry step. Derived per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedDimensions {
    pub optimal_width: f64,
    pub optimal_height: f64,
    pub crop: Option<CropRect>,
}

impl ComputedDimensions {
    /// Pixel size of the intermediate canvas the source is resampled into.
    ///
    /// Never smaller than 1x1, and never smaller than the crop it must contain.
    pub fn canvas_size(&self) -> (u32, u32) {
        let w = to_pixels(self.optimal_width);
        let h = to_pixels(self.optimal_height);
        match self.crop {
            Some(crop) => (w.max(crop.width), h.max(crop.height)),
            None => (w, h),
        }
    }

    /// Reject geometry whose canvas holds more than `max_pixels` pixels.
    ///
    /// The canvas is the largest buffer a render allocates, so this bounds
    /// memory before any pixels exist.
    pub fn within_budget(self, max_pixels: u64) -> Result<Self, GeometryError> {
        let (width, height) = self.canvas_size();
        if u64::from(width) * u64::from(height) > max_pixels {
            return Err(GeometryError::TooLarge {
                width,
                height,
                max_pixels,
            });
        }
        Ok(self)
    }

    /// Pixel size of the final image.
    pub fn output_size(&self) -> (u32, u32) {
        match self.crop {
            Some(crop) => (crop.width, crop.height),
            None => self.canvas_size(),
        }
    }
}

fn to_pixels(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Width that keeps the source aspect ratio at a fixed height.
fn size_by_fixed_height(source: (u32, u32), height: u32) -> f64 {
    let ratio = source.0 as f64 / source.1 as f64;
    height as f64 * ratio
}

/// Height that keeps the source aspect ratio at a fixed width.
fn size_by_fixed_width(source: (u32, u32), width: u32) -> f64 {
    let ratio = source.1 as f64 / source.0 as f64;
    width as f64 * ratio
}

fn height_authoritative(source: (u32, u32), requested: (u32, u32)) -> ComputedDimensions {
    ComputedDimensions {
        optimal_width: size_by_fixed_height(source, requested.1),
        optimal_height: requested.1 as f64,
        crop: None,
    }
}

fn width_authoritative(source: (u32, u32), requested: (u32, u32)) -> ComputedDimensions {
    ComputedDimensions {
        optimal_width: requested.0 as f64,
        optimal_height: size_by_fixed_width(source, requested.0),
        crop: None,
    }
}

fn exact(requested: (u32, u32)) -> ComputedDimensions {
    ComputedDimensions {
        optimal_width: requested.0 as f64,
        optimal_height: requested.1 as f64,
        crop: None,
    }
}

fn auto(source: (u32, u32), requested: (u32, u32)) -> ComputedDimensions {
    let (src_w, src_h) = source;
    let (req_w, req_h) = requested;

    if src_h < src_w {
        width_authoritative(source, requested)
    } else if src_h > src_w {
        height_authoritative(source, requested)
    } else if req_h < req_w {
        // Square source: the larger requested side wins
        width_authoritative(source, requested)
    } else if req_h > req_w {
        height_authoritative(source, requested)
    } else {
        exact(requested)
    }
}

fn crop(source: (u32, u32), requested: (u32, u32)) -> Result<ComputedDimensions, GeometryError> {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    let (req_w, req_h) = requested;

    let height_ratio = src_h / req_h as f64;
    let width_ratio = src_w / req_w as f64;
    let optimal_ratio = height_ratio.min(width_ratio);

    if !(optimal_ratio.is_finite() && optimal_ratio > 0.0) {
        return Err(GeometryError::DegenerateRequest {
            width: req_w,
            height: req_h,
        });
    }

    let optimal_width = src_w / optimal_ratio;
    let optimal_height = src_h / optimal_ratio;

    Ok(ComputedDimensions {
        optimal_width,
        optimal_height,
        crop: Some(CropRect {
            x: (optimal_width - req_w as f64) / 2.0,
            y: (optimal_height - req_h as f64) / 2.0,
            width: req_w,
            height: req_h,
        }),
    })
}

/// Compute the canvas (and optional crop) for a resize request.
///
/// # Arguments
/// * `source` - Decoded source dimensions (width, height)
/// * `requested` - Requested output dimensions (width, height)
/// * `policy` - Which dimension rule to apply
///
/// # Errors
/// Any zero dimension in `source` or `requested` is rejected instead of
/// dividing by zero.
///
/// # Examples
/// ```
/// use resize_cache::imaging::{ResizePolicy, resolve_dimensions};
///
/// // 16:9 landscape into a 100x100 box: width is authoritative
/// let dims = resolve_dimensions((1920, 1080), (100, 100), ResizePolicy::Auto).unwrap();
/// assert_eq!(dims.output_size(), (100, 56));
///
/// // Portrait crop: cover 100x100, then cut the center
/// let dims = resolve_dimensions((1080, 1920), (100, 100), ResizePolicy::Crop).unwrap();
/// assert_eq!(dims.canvas_size(), (100, 178));
/// assert_eq!(dims.output_size(), (100, 100));
/// ```
pub fn resolve_dimensions(
    source: (u32, u32),
    requested: (u32, u32),
    policy: ResizePolicy,
) -> Result<ComputedDimensions, GeometryError> {
    if requested.0 == 0 || requested.1 == 0 {
        return Err(GeometryError::DegenerateRequest {
            width: requested.0,
            height: requested.1,
        });
    }
    if source.0 == 0 || source.1 == 0 {
        return Err(GeometryError::DegenerateSource {
            width: source.0,
            height: source.1,
        });
    }

    Ok(match policy {
        ResizePolicy::Exact => exact(requested),
        ResizePolicy::Portrait => height_authoritative(source, requested),
        ResizePolicy::Landscape => width_authoritative(source, requested),
        ResizePolicy::Auto => auto(source, requested),
        ResizePolicy::Crop => crop(source, requested)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    /// Dimension grid used by the sweep tests below.
    const SIDES: &[u32] = &[1, 2, 3, 7, 50, 99, 100, 101, 333, 640, 1080, 1920, 4000];

    fn sweep(mut check: impl FnMut((u32, u32), (u32, u32))) {
        for &sw in SIDES {
            for &sh in SIDES {
                for &rw in SIDES {
                    for &rh in SIDES {
                        check((sw, sh), (rw, rh));
                    }
                }
            }
        }
    }

    fn resolve(source: (u32, u32), requested: (u32, u32), policy: ResizePolicy) -> ComputedDimensions {
        resolve_dimensions(source, requested, policy).unwrap()
    }

    // =========================================================================
    // ResizePolicy parsing
    // =========================================================================

    #[test]
    fn policy_parses_all_names() {
        for policy in ResizePolicy::ALL {
            assert_eq!(policy.as_str().parse::<ResizePolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn policy_rejects_unknown_name() {
        let err = "stretch".parse::<ResizePolicy>().unwrap_err();
        assert_eq!(err, PolicyParseError("stretch".into()));
    }

    #[test]
    fn policy_parsing_is_case_sensitive() {
        assert!("Crop".parse::<ResizePolicy>().is_err());
    }

    #[test]
    fn policy_default_is_auto() {
        assert_eq!(ResizePolicy::default(), ResizePolicy::Auto);
    }

    #[test]
    fn policy_display_matches_name() {
        assert_eq!(ResizePolicy::Landscape.to_string(), "landscape");
    }

    // =========================================================================
    // Formula sweeps (all policies but crop)
    // =========================================================================

    #[test]
    fn exact_uses_requested_size() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Exact);
            assert_eq!(d.optimal_width, req.0 as f64);
            assert_eq!(d.optimal_height, req.1 as f64);
            assert!(d.crop.is_none());
        });
    }

    #[test]
    fn portrait_height_is_authoritative() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Portrait);
            let expected_w = req.1 as f64 * (src.0 as f64 / src.1 as f64);
            assert_eq!(d.optimal_height, req.1 as f64);
            assert!((d.optimal_width - expected_w).abs() < EPSILON);
        });
    }

    #[test]
    fn landscape_width_is_authoritative() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Landscape);
            let expected_h = req.0 as f64 * (src.1 as f64 / src.0 as f64);
            assert_eq!(d.optimal_width, req.0 as f64);
            assert!((d.optimal_height - expected_h).abs() < EPSILON);
        });
    }

    #[test]
    fn auto_follows_source_orientation() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Auto);
            let expected = if src.0 > src.1 || (src.0 == src.1 && req.0 > req.1) {
                resolve(src, req, ResizePolicy::Landscape)
            } else if src.0 < src.1 || req.0 < req.1 {
                resolve(src, req, ResizePolicy::Portrait)
            } else {
                resolve(src, req, ResizePolicy::Exact)
            };
            assert_eq!(d, expected, "src={src:?} req={req:?}");
        });
    }

    #[test]
    fn canvas_is_never_empty() {
        // 4000x1 scaled to width 1 would round to a zero-height canvas
        let d = resolve((4000, 1), (1, 1), ResizePolicy::Landscape);
        assert_eq!(d.canvas_size(), (1, 1));
    }

    // =========================================================================
    // Auto scenarios
    // =========================================================================

    #[test]
    fn auto_wide_source_into_square_box() {
        let d = resolve((1920, 1080), (100, 100), ResizePolicy::Auto);
        assert_eq!(d.optimal_width, 100.0);
        assert!((d.optimal_height - 56.25).abs() < EPSILON);
        assert_eq!(d.output_size(), (100, 56));
    }

    #[test]
    fn auto_tall_source_into_square_box() {
        let d = resolve((1080, 1920), (100, 100), ResizePolicy::Auto);
        assert_eq!(d.output_size(), (56, 100));
    }

    #[test]
    fn auto_square_source_wider_request() {
        // Larger requested side (width) is authoritative
        let d = resolve((500, 500), (300, 200), ResizePolicy::Auto);
        assert_eq!(d.output_size(), (300, 300));
    }

    #[test]
    fn auto_square_source_taller_request() {
        let d = resolve((500, 500), (200, 300), ResizePolicy::Auto);
        assert_eq!(d.output_size(), (300, 300));
    }

    #[test]
    fn auto_square_to_square() {
        let d = resolve((500, 500), (120, 120), ResizePolicy::Auto);
        assert_eq!(d.output_size(), (120, 120));
    }

    // =========================================================================
    // Crop
    // =========================================================================

    #[test]
    fn crop_portrait_source_into_square() {
        let d = resolve((1080, 1920), (100, 100), ResizePolicy::Crop);
        assert!((d.optimal_width - 100.0).abs() < EPSILON);
        assert!((d.optimal_height - 177.777_777_777).abs() < 1e-6);
        assert_eq!(d.canvas_size(), (100, 178));
        assert_eq!(d.output_size(), (100, 100));

        let crop = d.crop.unwrap();
        assert!(crop.x.abs() < EPSILON);
        assert!((crop.y - 38.888_888_888).abs() < 1e-6);
        assert_eq!(crop.pixel_origin(d.canvas_size()), (0, 39));
    }

    #[test]
    fn crop_landscape_source_into_portrait_box() {
        // 800x600 into 400x500: height ratio 1.2 < width ratio 2.0
        let d = resolve((800, 600), (400, 500), ResizePolicy::Crop);
        assert_eq!(d.canvas_size(), (667, 500));
        let crop = d.crop.unwrap();
        assert_eq!(crop.pixel_origin(d.canvas_size()), (133, 0));
    }

    #[test]
    fn crop_same_aspect_has_zero_origin() {
        let d = resolve((800, 600), (400, 300), ResizePolicy::Crop);
        assert_eq!(d.canvas_size(), (400, 300));
        assert_eq!(d.crop.unwrap().pixel_origin(d.canvas_size()), (0, 0));
    }

    #[test]
    fn crop_covers_requested_box() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Crop);
            assert!(d.optimal_width >= req.0 as f64 - 1e-6, "src={src:?} req={req:?}");
            assert!(d.optimal_height >= req.1 as f64 - 1e-6, "src={src:?} req={req:?}");
            assert_eq!(d.output_size(), req);

            let canvas = d.canvas_size();
            let crop = d.crop.unwrap();
            let (x, y) = crop.pixel_origin(canvas);
            assert!(x + crop.width <= canvas.0, "src={src:?} req={req:?}");
            assert!(y + crop.height <= canvas.1, "src={src:?} req={req:?}");
        });
    }

    #[test]
    fn crop_matches_one_side_tightly() {
        sweep(|src, req| {
            let d = resolve(src, req, ResizePolicy::Crop);
            let width_tight = (d.optimal_width - req.0 as f64).abs() < 1e-6;
            let height_tight = (d.optimal_height - req.1 as f64).abs() < 1e-6;
            assert!(width_tight || height_tight, "src={src:?} req={req:?}");
        });
    }

    #[test]
    fn crop_upscales_small_sources() {
        let d = resolve((10, 20), (100, 100), ResizePolicy::Crop);
        assert_eq!(d.canvas_size(), (100, 200));
        assert_eq!(d.output_size(), (100, 100));
    }

    // =========================================================================
    // Degenerate input
    // =========================================================================

    #[test]
    fn zero_requested_width_is_rejected() {
        for policy in ResizePolicy::ALL {
            assert_eq!(
                resolve_dimensions((100, 100), (0, 50), policy),
                Err(GeometryError::DegenerateRequest {
                    width: 0,
                    height: 50
                })
            );
        }
    }

    #[test]
    fn zero_requested_height_is_rejected() {
        assert!(matches!(
            resolve_dimensions((100, 100), (50, 0), ResizePolicy::Crop),
            Err(GeometryError::DegenerateRequest { .. })
        ));
    }

    #[test]
    fn zero_source_dimension_is_rejected() {
        assert_eq!(
            resolve_dimensions((0, 100), (50, 50), ResizePolicy::Portrait),
            Err(GeometryError::DegenerateSource {
                width: 0,
                height: 100
            })
        );
    }

    // =========================================================================
    // Pixel budget
    // =========================================================================

    const BUDGET: u64 = 50_000_000;

    #[test]
    fn ordinary_request_is_within_budget() {
        let d = resolve_dimensions((6000, 4000), (1920, 1080), ResizePolicy::Crop).unwrap();
        assert_eq!(d.within_budget(BUDGET), Ok(d));
    }

    #[test]
    fn absurd_request_exceeds_budget() {
        let d = resolve_dimensions((8, 8), (4_000_000_000, 4_000_000_000), ResizePolicy::Exact)
            .unwrap();
        assert!(matches!(
            d.within_budget(BUDGET),
            Err(GeometryError::TooLarge { width: 4_000_000_000, .. })
        ));
    }

    #[test]
    fn thin_source_blows_up_aspect_policies() {
        // A modest box over a 1px-wide strip scales the long side by 4000x
        for policy in [ResizePolicy::Crop, ResizePolicy::Landscape] {
            let d = resolve_dimensions((1, 4000), (4000, 4000), policy).unwrap();
            assert_eq!(d.canvas_size(), (4000, 16_000_000), "{policy}");
            assert!(d.within_budget(BUDGET).is_err(), "{policy}");
        }
    }

    #[test]
    fn budget_is_inclusive() {
        let d = resolve_dimensions((10, 10), (100, 50), ResizePolicy::Exact).unwrap();
        assert!(d.within_budget(5000).is_ok());
        assert!(d.within_budget(4999).is_err());
    }
}

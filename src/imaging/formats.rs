//! Which formats are read and written for a given source extension.
//!
//! | Source | Primary cache file | Alternate (`.webp`) |
//! |---|---|---|
//! | `.jpg` / `.jpeg` | JPEG at requested quality | yes |
//! | `.png` | PNG | yes |
//! | `.gif` | GIF | no |
//! | anything else | nothing written | no |

use image::ImageFormat;

/// Extension appended to the primary cache path for the alternate encoding.
pub const ALT_EXTENSION: &str = "webp";

/// Source formats that can be decoded and re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
}

/// Formats the backend can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl SourceFormat {
    /// Match a file extension, with or without the leading dot, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "gif" => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    /// Decoder to use for this source.
    pub fn image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::Gif => ImageFormat::Gif,
        }
    }

    /// Format of the primary cache file (same family as the source).
    pub fn primary_output(self) -> OutputFormat {
        match self {
            SourceFormat::Jpeg => OutputFormat::Jpeg,
            SourceFormat::Png => OutputFormat::Png,
            SourceFormat::Gif => OutputFormat::Gif,
        }
    }

    /// Format of the alternate cache file, if this source gets one.
    pub fn alternate_output(self) -> Option<OutputFormat> {
        match self {
            SourceFormat::Jpeg | SourceFormat::Png => Some(OutputFormat::WebP),
            SourceFormat::Gif => None,
        }
    }
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Gif => "GIF",
            OutputFormat::WebP => "WebP",
        }
    }
}

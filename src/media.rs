//! Media type detection and image introspection for package assets.

use std::io::Cursor;
use std::path::Path;

use image::{ImageError, ImageReader};

use crate::error::{Error, Result};

/// Media formats that can appear in an issue package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// CSS stylesheet
    Css,
    /// XHTML content document
    Xhtml,
    /// Unknown/binary format
    Binary,
}

impl MediaFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Css => "text/css",
            MediaFormat::Xhtml => "application/xhtml+xml",
            MediaFormat::Binary => "application/octet-stream",
        }
    }

    /// Check if this format represents an image.
    pub fn is_image(self) -> bool {
        matches!(self, MediaFormat::Jpeg | MediaFormat::Png | MediaFormat::Gif)
    }
}

/// Detect a format from the file name, falling back to magic bytes.
pub fn detect_media_format(path: &str, data: &[u8]) -> MediaFormat {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        return MediaFormat::Jpeg;
    }
    if path_lower.ends_with(".png") {
        return MediaFormat::Png;
    }
    if path_lower.ends_with(".gif") {
        return MediaFormat::Gif;
    }
    if path_lower.ends_with(".css") {
        return MediaFormat::Css;
    }
    if path_lower.ends_with(".xhtml") {
        return MediaFormat::Xhtml;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return MediaFormat::Jpeg;
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return MediaFormat::Png;
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return MediaFormat::Gif;
    }

    MediaFormat::Binary
}

/// Read the pixel dimensions `(width, height)` of an encoded image.
///
/// Only the header is decoded. `path` is used for error reporting.
pub fn image_dimensions(path: &Path, data: &[u8]) -> Result<(u32, u32)> {
    let invalid = |source: ImageError| Error::InvalidImage {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| invalid(ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(invalid)
}

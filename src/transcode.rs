//! Decode, resize and JPEG-encode source images.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::ThumbnailError;

/// Maximum thumbnail width in pixels.
pub const THUMBNAIL_WIDTH: u32 = 300;

/// JPEG quality factor of the encoded thumbnail.
pub const JPEG_QUALITY: u8 = 80;

/// An encoded thumbnail held in memory.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// JPEG bytes.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Produce a JPEG thumbnail from encoded image bytes.
///
/// The source format is sniffed from the bytes. Images wider than
/// [`THUMBNAIL_WIDTH`] are scaled down to that width keeping the aspect
/// ratio; narrower images keep their size.
///
/// # Errors
///
/// Returns [`ThumbnailError::Transcode`] if the bytes are not a decodable
/// image or the JPEG encoder fails.
pub fn make_thumbnail(data: &[u8]) -> Result<Thumbnail, ThumbnailError> {
    let img = image::load_from_memory(data)
        .map_err(|e| ThumbnailError::Transcode(format!("Failed to decode image: {e}")))?;

    let (width, height) = scaled_dimensions(img.width(), img.height());
    let img = if width == img.width() {
        img
    } else {
        debug!(
            original_width = img.width(),
            original_height = img.height(),
            width,
            height,
            "resizing image"
        );
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel or 16-bit samples.
    let rgb = img.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ThumbnailError::Transcode(format!("Failed to encode JPEG: {e}")))?;

    let data = buf.into_inner();
    debug!(output_size = data.len(), quality = JPEG_QUALITY, "encoded thumbnail");

    Ok(Thumbnail { data, width, height })
}

/// Target dimensions for a `width`×`height` source.
fn scaled_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= THUMBNAIL_WIDTH {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(THUMBNAIL_WIDTH) + u64::from(width) / 2)
        / u64::from(width);
    let scaled = u32::try_from(scaled).unwrap_or(u32::MAX).max(1);
    (THUMBNAIL_WIDTH, scaled)
}

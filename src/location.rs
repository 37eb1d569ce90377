//! Storage key derivation and public URL formatting.

use tracing::warn;

use crate::error::ThumbnailError;

/// Prefix under which every thumbnail is stored.
pub const KEY_PREFIX: &str = "thumbnails/";

/// Content type of every uploaded thumbnail.
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Bucket and region thumbnails are published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Bucket name.
    pub bucket: String,
    /// AWS region of the bucket.
    pub region: String,
}

impl Destination {
    /// Public URL of `key` in this bucket.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, key)
    }
}

/// Derive the storage key for a source image URL.
///
/// The key is `thumbnails/` followed by everything after the last `/`. Two
/// URLs ending in the same segment map to the same key. The segment is
/// used verbatim: no decoding, sanitizing or escaping.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidKey`] if the URL ends with `/` or has
/// no `/` at all.
pub fn derive_key(source_url: &str) -> Result<String, ThumbnailError> {
    let segment = match source_url.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => segment,
        _ => return Err(ThumbnailError::InvalidKey(source_url.to_string())),
    };

    if needs_escaping(segment) {
        warn!(source_url, segment, "storage key contains characters that are not URL-safe");
    }

    Ok(format!("{KEY_PREFIX}{segment}"))
}

/// Format the public virtual-hosted-style URL of an object.
#[must_use]
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

/// Query strings, fragments, whitespace and percent-escapes end up in the
/// key as-is and produce a public URL that does not point at the object.
fn needs_escaping(segment: &str) -> bool {
    segment.chars().any(|c| matches!(c, '?' | '#' | '%') || c.is_whitespace())
}

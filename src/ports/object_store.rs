//! Object store port for publishing thumbnails.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ThumbnailError;

/// A single object write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutObjectRequest {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// MIME type stored with the object.
    pub content_type: String,
    /// Object bytes.
    #[serde(with = "super::base64_bytes")]
    pub body: Vec<u8>,
}

/// Boxed future type returned by [`ObjectStore::put`].
pub type PutFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ThumbnailError>> + Send + 'a>>;

/// Writes objects to a bucket-addressed store such as S3.
pub trait ObjectStore: Send + Sync {
    /// Store `request.body` under `request.bucket`/`request.key`.
    fn put(&self, request: &PutObjectRequest) -> PutFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_request_serialization() {
        let request = PutObjectRequest {
            bucket: "thumbs".into(),
            key: "thumbnails/cat.png".into(),
            content_type: "image/jpeg".into(),
            body: vec![0xFF, 0xD8, 0xFF, 0xE0], // JPEG magic bytes
        };
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: PutObjectRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.key, "thumbnails/cat.png");
        assert_eq!(deserialized.content_type, "image/jpeg");
        assert_eq!(deserialized.body, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }
}

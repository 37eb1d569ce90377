//! Image fetcher port for downloading source images.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ThumbnailError;

/// Raw body of a downloaded source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedImage {
    /// Response body bytes.
    #[serde(with = "super::base64_bytes")]
    pub data: Vec<u8>,
    /// `Content-Type` header sent by the server, if any.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Boxed future type returned by [`ImageFetcher::fetch`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FetchedImage, ThumbnailError>> + Send + 'a>>;

/// Downloads the full body of an image URL.
pub trait ImageFetcher: Send + Sync {
    /// Fetch `url`. Any non-success status is an error.
    fn fetch(&self, url: &str) -> FetchFuture<'_>;
}

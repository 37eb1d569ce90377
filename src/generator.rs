//! The fetch → transcode → upload pipeline.

use tracing::{error, info};

use crate::error::ThumbnailError;
use crate::location::{derive_key, Destination, CONTENT_TYPE};
use crate::ports::image_fetcher::FetchedImage;
use crate::ports::{ImageFetcher, ObjectStore, PutObjectRequest};
use crate::transcode::make_thumbnail;

/// Produces thumbnails of remote images and publishes them.
///
/// Holds no mutable state; one instance can serve concurrent calls.
pub struct ThumbnailGenerator {
    fetcher: Box<dyn ImageFetcher>,
    store: Box<dyn ObjectStore>,
    destination: Destination,
}

impl ThumbnailGenerator {
    /// Create a generator publishing to `destination`.
    #[must_use]
    pub fn new(
        fetcher: Box<dyn ImageFetcher>,
        store: Box<dyn ObjectStore>,
        destination: Destination,
    ) -> Self {
        Self { fetcher, store, destination }
    }

    /// Fetch `image_url`, store a 300px-wide JPEG thumbnail of it and return
    /// the thumbnail's public URL.
    ///
    /// # Errors
    ///
    /// Every failure is logged with its cause and reported as
    /// [`ThumbnailError::GenerationFailed`]. Nothing written before the
    /// failure is rolled back.
    pub async fn generate(&self, image_url: &str) -> Result<String, ThumbnailError> {
        match self.run(image_url).await {
            Ok(url) => Ok(url),
            Err(e) => {
                error!(image_url, stage = e.stage(), error = %e, "Thumbnail generation failed");
                Err(ThumbnailError::GenerationFailed)
            }
        }
    }

    async fn run(&self, image_url: &str) -> Result<String, ThumbnailError> {
        let FetchedImage { data, content_type } = self.fetcher.fetch(image_url).await?;

        let thumbnail = tokio::task::spawn_blocking(move || make_thumbnail(&data))
            .await
            .map_err(|e| ThumbnailError::Transcode(format!("Transcode task failed: {e}")))?
            .map_err(|e| with_content_type(e, content_type.as_deref()))?;

        let key = derive_key(image_url)?;
        let request = PutObjectRequest {
            bucket: self.destination.bucket.clone(),
            key,
            content_type: CONTENT_TYPE.to_string(),
            body: thumbnail.data,
        };
        self.store.put(&request).await?;

        let url = self.destination.public_url(&request.key);
        info!(
            image_url,
            key = %request.key,
            width = thumbnail.width,
            height = thumbnail.height,
            "stored thumbnail"
        );
        Ok(url)
    }
}

/// Name the served content type in a transcode error; an HTML error page
/// or a redirect body is the usual cause.
fn with_content_type(err: ThumbnailError, content_type: Option<&str>) -> ThumbnailError {
    match (err, content_type) {
        (ThumbnailError::Transcode(message), Some(content_type)) => {
            ThumbnailError::Transcode(format!("{message} (served as {content_type})"))
        }
        (err, _) => err,
    }
}

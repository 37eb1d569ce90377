//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::http::HttpImageFetcher;
use crate::adapters::live::s3::S3ObjectStore;
use crate::adapters::recording::image_fetcher::RecordingImageFetcher;
use crate::adapters::recording::object_store::RecordingObjectStore;
use crate::adapters::replaying::image_fetcher::ReplayingImageFetcher;
use crate::adapters::replaying::object_store::ReplayingObjectStore;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::{load_cassette, CASSETTE_FILE};
use crate::config::Settings;
use crate::error::ThumbnailError;
use crate::generator::ThumbnailGenerator;
use crate::location::Destination;
use crate::ports::{ImageFetcher, ObjectStore};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Source image fetcher port.
    pub fetcher: Box<dyn ImageFetcher>,
    /// Thumbnail store port.
    pub store: Box<dyn ObjectStore>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// Every adapter holding the recorder must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::Io`] if the cassette file cannot be written,
    /// or [`ThumbnailError::Config`] if an adapter still holds the recorder.
    pub fn finish(self) -> Result<PathBuf, ThumbnailError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| ThumbnailError::Config("Recording adapter still has references".into()))?
            .into_inner()
            .map_err(|e| ThumbnailError::Config(format!("Recorder lock poisoned: {e}")))?;
        Ok(recorder.finish()?)
    }
}

impl ServiceContext {
    /// Create a live context: HTTP fetcher and S3 client for the thumbnail
    /// store.
    pub async fn live(settings: &Settings) -> Self {
        let store = S3ObjectStore::connect(&settings.credentials, &settings.thumbnail).await;
        Self { fetcher: Box::new(HttpImageFetcher::new()), store: Box::new(store) }
    }

    /// Create a recording context that wraps the live adapters with a
    /// shared recorder.
    pub async fn recording(settings: &Settings) -> (Self, RecordingSession) {
        let live = Self::live(settings).await;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".thumbnailer/cassettes").join(&timestamp).join(CASSETTE_FILE);
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-thumbnailer"),
            get_commit_hash(),
        )));

        let ctx = Self {
            fetcher: Box::new(RecordingImageFetcher::new(live.fetcher, Arc::clone(&recorder))),
            store: Box::new(RecordingObjectStore::new(live.store, Arc::clone(&recorder))),
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file. No network access.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ThumbnailError> {
        let replayer = load_cassette(path)
            .map_err(|e| ThumbnailError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            fetcher: Box::new(ReplayingImageFetcher::new(Arc::clone(&replayer))),
            store: Box::new(ReplayingObjectStore::new(replayer)),
        })
    }

    /// Build the generator publishing to `destination`.
    #[must_use]
    pub fn into_generator(self, destination: Destination) -> ThumbnailGenerator {
        ThumbnailGenerator::new(self.fetcher, self.store, destination)
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(path: PathBuf) -> RecordingSession {
        let recorder = CassetteRecorder::new(path, "context-test", "abc");
        RecordingSession { recorder: Arc::new(Mutex::new(recorder)) }
    }

    #[test]
    fn finish_writes_cassette() {
        let dir = std::env::temp_dir().join("thumbnailer_session_test");
        let path = dir.join(CASSETTE_FILE);
        let session = session(path.clone());
        session.recorder.lock().unwrap().record("object_store", "put", json!({}), json!({"Ok": null}));

        assert_eq!(session.finish().unwrap(), path);
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = std::env::temp_dir().join("thumbnailer_session_blocked_test");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let err = session(blocker.join("nested").join(CASSETTE_FILE)).finish().unwrap_err();
        assert!(matches!(err, ThumbnailError::Io(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn finish_refuses_while_adapter_holds_recorder() {
        let session = session(std::env::temp_dir().join("thumbnailer_never_written.yaml"));
        let _held = Arc::clone(&session.recorder);
        assert!(matches!(session.finish().unwrap_err(), ThumbnailError::Config(_)));
    }
}

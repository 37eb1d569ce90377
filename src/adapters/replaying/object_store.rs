//! Replaying adapter for the `ObjectStore` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ThumbnailError;
use crate::ports::object_store::{ObjectStore, PutFuture, PutObjectRequest};

/// Serves recorded object writes from a cassette. Nothing is uploaded.
pub struct ReplayingObjectStore {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingObjectStore {
    /// Create a replaying store backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ObjectStore for ReplayingObjectStore {
    fn put(&self, request: &PutObjectRequest) -> PutFuture<'_> {
        let key = request.key.clone();
        let output = next_output(&self.replayer, "object_store", "put");
        Box::pin(async move {
            replay_result::<()>(output)
                .map_err(|e| ThumbnailError::Upload { key, message: e.to_string() })
        })
    }
}

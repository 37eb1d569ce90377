//! Recording adapter for the `ObjectStore` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::object_store::{ObjectStore, PutFuture, PutObjectRequest};

/// Records object writes while delegating to an inner implementation.
pub struct RecordingObjectStore {
    inner: Box<dyn ObjectStore>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingObjectStore {
    /// Creates a new recording store wrapping the given implementation.
    pub fn new(inner: Box<dyn ObjectStore>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ObjectStore for RecordingObjectStore {
    fn put(&self, request: &PutObjectRequest) -> PutFuture<'_> {
        let request_clone = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.put(&request_clone).await;
            record_result(&recorder, "object_store", "put", &request_clone, &result);
            result
        })
    }
}

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::types::{BatchResult, FileReport};

/// Append-only collector shared by all workers of a batch.
#[derive(Default)]
pub struct ResultSink {
    inner: Mutex<BatchResult>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, path: PathBuf, report: FileReport) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).record_success(path, report);
    }

    pub fn failure(&self, path: PathBuf, reason: impl Into<String>) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).record_failure(path, reason);
    }

    /// Consumes the sink once every worker has joined.
    pub fn into_inner(self) -> BatchResult {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

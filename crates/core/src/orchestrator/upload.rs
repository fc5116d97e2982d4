//! Scoped ownership of an uploaded temporary file.

use std::io::ErrorKind;
use tracing::{debug, warn};

use super::types::UploadedFile;
use crate::metrics::UPLOAD_CLEANUP_FAILURES;

/// Deletes an upload's temporary file exactly once.
///
/// Call [`UploadGuard::release`] on every normal exit path. If the guard is
/// dropped without being released (the request future was cancelled or a
/// panic unwound through it) the file is removed synchronously in `Drop`.
/// Cleanup failures are logged and never surface as errors.
#[derive(Debug)]
pub struct UploadGuard {
    upload: UploadedFile,
    armed: bool,
}

impl UploadGuard {
    pub fn new(upload: UploadedFile) -> Self {
        Self {
            upload,
            armed: true,
        }
    }

    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }

    /// Hands the file back without deleting it.
    pub fn into_upload(mut self) -> UploadedFile {
        self.armed = false;
        std::mem::take(&mut self.upload)
    }

    /// Deletes the temporary file.
    pub async fn release(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.upload.path).await {
            Ok(()) => debug!("Removed upload {}", self.upload.path.display()),
            Err(e) => log_cleanup_failure(&self.upload, &e),
        }
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.upload.path) {
            Ok(()) => debug!(
                "Removed upload {} on early exit",
                self.upload.path.display()
            ),
            Err(e) => log_cleanup_failure(&self.upload, &e),
        }
    }
}

fn log_cleanup_failure(upload: &UploadedFile, error: &std::io::Error) {
    UPLOAD_CLEANUP_FAILURES.inc();
    if error.kind() == ErrorKind::NotFound {
        warn!(
            "Upload {} ({}) was already gone during cleanup",
            upload.path.display(),
            upload.original_name
        );
    } else {
        warn!(
            "Failed to remove upload {} ({}): {}",
            upload.path.display(),
            upload.original_name,
            error
        );
    }
}

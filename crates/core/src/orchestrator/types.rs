//! Types for the conversion orchestrator.

use std::path::PathBuf;

/// A file received by the transport and parked in temporary storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    /// Temporary storage path chosen by the upload decoder.
    pub path: PathBuf,
    /// Name the client sent the file under.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn new(path: PathBuf, original_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path,
            original_name: original_name.into(),
            size_bytes,
        }
    }
}

/// One conversion: an upload and the format it should become.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub upload: UploadedFile,
    /// Requested output format token, e.g. `"png"` or `"mp3"`.
    pub target_format: String,
}

impl ConversionRequest {
    pub fn new(upload: UploadedFile, target_format: impl Into<String>) -> Self {
        Self {
            upload,
            target_format: target_format.into(),
        }
    }
}

//! Types for the converter module.

use std::path::PathBuf;

use crate::classifier::MediaFamily;

/// What an adapter is asked to convert.
#[derive(Debug, Clone)]
pub struct ConversionInput {
    /// Where the upload is stored. Borrowed for the duration of one call.
    pub path: PathBuf,
    /// Name the client sent the file under.
    pub file_name: String,
    /// Size of the upload in bytes.
    pub size_bytes: u64,
    /// Family the file was classified into.
    pub family: MediaFamily,
    /// Requested output format token (lowercase, no leading dot).
    pub target_format: String,
}

impl ConversionInput {
    /// Lowercased extension of the original file name, without the dot.
    pub fn source_extension(&self) -> String {
        crate::classifier::extension_of(&self.file_name)
            .trim_start_matches('.')
            .to_string()
    }
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The converted artifact.
    pub bytes: Vec<u8>,
    /// Format token the artifact was encoded as.
    pub format: String,
    /// Family of the source file.
    pub family: MediaFamily,
}

impl ConversionOutput {
    /// Value for the `Content-Type` response header.
    pub fn content_type(&self) -> String {
        format!("application/{}", self.format)
    }

    /// Download name offered to the client.
    pub fn file_name(&self) -> String {
        format!("converted.{}", self.format)
    }
}

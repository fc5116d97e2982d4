//! Configuration for the converter adapters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by the document, image and media adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the LibreOffice `soffice` binary.
    #[serde(default = "default_soffice_path")]
    pub soffice_path: PathBuf,

    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// JPEG encoder quality (1-100).
    #[serde(default = "default_quality")]
    pub jpeg_quality: u8,

    /// WebP encoder quality (1-100).
    #[serde(default = "default_quality")]
    pub webp_quality: u8,

    /// Timeout for a single conversion in seconds. 0 disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_soffice_path() -> PathBuf {
    PathBuf::from("soffice")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            soffice_path: default_soffice_path(),
            ffmpeg_path: default_ffmpeg_path(),
            ffmpeg_log_level: default_log_level(),
            jpeg_quality: default_quality(),
            webp_quality: default_quality(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ConverterConfig {
    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the ffmpeg binary path.
    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = path;
        self
    }

    /// Sets the soffice binary path.
    pub fn with_soffice_path(mut self, path: PathBuf) -> Self {
        self.soffice_path = path;
        self
    }

    /// The conversion timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

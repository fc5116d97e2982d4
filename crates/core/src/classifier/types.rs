//! Media family tags and the static extension table.

use serde::{Deserialize, Serialize};

const DOCUMENT_EXTENSIONS: &[&str] = &[".doc", ".docx", ".pdf", ".txt", ".rtf", ".odt"];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".wmv", ".flv", ".mkv", ".webm"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".m4a", ".aac", ".wma"];

/// Coarse category of an uploaded file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFamily {
    Document,
    Image,
    Video,
    Audio,
    Unsupported,
}

impl MediaFamily {
    /// Recognized families in lookup priority order.
    pub const RECOGNIZED: [MediaFamily; 4] = [
        MediaFamily::Document,
        MediaFamily::Image,
        MediaFamily::Video,
        MediaFamily::Audio,
    ];

    /// Lowercase extensions (with the leading dot) that belong to this family.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Document => DOCUMENT_EXTENSIONS,
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
            Self::Audio => AUDIO_EXTENSIONS,
            Self::Unsupported => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for MediaFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

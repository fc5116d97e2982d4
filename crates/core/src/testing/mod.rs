//! Testing utilities and mock implementations.
//!
//! This module provides a mock adapter and fixtures so the orchestrator and
//! the HTTP layer can be tested without LibreOffice or FFmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use transmute_core::testing::{fixtures, MockConverter};
//!
//! let media = MockConverter::named("media");
//! media.set_next_error(ConverterError::engine_failure("ffmpeg", "boom")).await;
//!
//! let upload = fixtures::write_upload(dir.path(), "clip.mkv", b"not a video");
//! ```

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use std::path::Path;

    use crate::orchestrator::UploadedFile;

    /// Encode a small gradient image in `format`.
    pub fn sample_image(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, 255])
        });
        let image = image::DynamicImage::ImageRgba8(buffer);
        let image = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };

        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, format)
            .expect("fixture image should encode");
        bytes.into_inner()
    }

    /// A 16x16 PNG.
    pub fn sample_png() -> Vec<u8> {
        sample_image(ImageFormat::Png, 16, 16)
    }

    /// Write `bytes` into `dir` the way the upload decoder stores files.
    pub fn write_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> UploadedFile {
        let path = dir.join(format!("upload-{:x}", upload_suffix(original_name, bytes)));
        std::fs::write(&path, bytes).expect("fixture upload should be writable");
        UploadedFile::new(path, original_name, bytes.len() as u64)
    }

    fn upload_suffix(name: &str, bytes: &[u8]) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        name.hash(&mut hasher);
        bytes.hash(&mut hasher);
        hasher.finish()
    }
}

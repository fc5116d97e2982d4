//! Converter adapters for the supported media families.
//!
//! This module provides the `Converter` trait and one adapter per external
//! engine:
//!
//! - Documents are rendered by LibreOffice (`soffice --headless --convert-to`)
//! - Images are re-encoded in process with the `image` and `webp` crates
//! - Video and audio share a single FFmpeg adapter
//!
//! # Example
//!
//! ```ignore
//! use transmute_core::converter::{Converter, ConversionInput, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let input = ConversionInput {
//!     path: PathBuf::from("uploads/5b1c0e"),
//!     file_name: "clip.mkv".to_string(),
//!     size_bytes: 1024,
//!     family: MediaFamily::Video,
//!     target_format: "mp4".to_string(),
//! };
//! let bytes = converter.convert(&input).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod libreoffice;
mod raster;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use libreoffice::LibreOfficeConverter;
pub use raster::ImageConverter;
pub use traits::Converter;
pub use types::{ConversionInput, ConversionOutput};

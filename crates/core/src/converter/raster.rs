//! Raster image adapter built on the `image` codecs, with lossy WebP from `webp`.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::ConversionInput;
use crate::classifier::MediaFamily;

const ENGINE: &str = "image";

/// Output formats the image adapter can encode.
const OUTPUT_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Encoders selectable by target token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageTarget {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl ImageTarget {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Re-encodes images in memory. No resizing or metadata handling.
pub struct ImageConverter {
    jpeg_quality: u8,
    webp_quality: u8,
}

impl ImageConverter {
    /// Creates an image converter using the qualities from `config`.
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            webp_quality: config.webp_quality,
        }
    }

    /// Creates a converter with default qualities.
    pub fn with_defaults() -> Self {
        Self::new(&ConverterConfig::default())
    }

    fn transcode(
        data: &[u8],
        target: ImageTarget,
        jpeg_quality: u8,
        webp_quality: u8,
    ) -> Result<Vec<u8>, ConverterError> {
        let img = image::load_from_memory(data).map_err(|e| {
            ConverterError::engine_failure(ENGINE, format!("Failed to decode image: {}", e))
        })?;

        let mut buffer = Vec::new();
        match target {
            ImageTarget::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
                rgb.write_with_encoder(encoder).map_err(encode_error)?;
            }
            ImageTarget::Png => {
                let img = match img {
                    DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                        DynamicImage::ImageRgba16(img.to_rgba16())
                    }
                    other => other,
                };
                img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                    .map_err(encode_error)?;
            }
            ImageTarget::Gif => {
                DynamicImage::ImageRgba8(img.to_rgba8())
                    .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Gif)
                    .map_err(encode_error)?;
            }
            ImageTarget::WebP => {
                let rgba = img.to_rgba8();
                let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
                buffer = encoder
                    .encode_simple(false, webp_quality as f32)
                    .map_err(|e| {
                        ConverterError::engine_failure(
                            ENGINE,
                            format!("Failed to encode image: WebP encoder error {:?}", e),
                        )
                    })?
                    .to_vec();
            }
        }

        Ok(buffer)
    }
}

fn encode_error(e: image::ImageError) -> ConverterError {
    ConverterError::engine_failure(ENGINE, format!("Failed to encode image: {}", e))
}

#[async_trait]
impl Converter for ImageConverter {
    fn name(&self) -> &str {
        ENGINE
    }

    async fn convert(&self, input: &ConversionInput) -> Result<Vec<u8>, ConverterError> {
        let target = ImageTarget::parse(&input.target_format).ok_or_else(|| {
            ConverterError::UnsupportedTargetFormat {
                family: MediaFamily::Image,
                format: input.target_format.clone(),
            }
        })?;

        let data = tokio::fs::read(&input.path).await?;
        debug!(
            "Encoding {} ({} bytes) as {:?}",
            input.file_name,
            data.len(),
            target
        );

        let (jpeg_quality, webp_quality) = (self.jpeg_quality, self.webp_quality);
        tokio::task::spawn_blocking(move || {
            Self::transcode(&data, target, jpeg_quality, webp_quality)
        })
        .await
        .map_err(|e| ConverterError::unexpected(format!("Image encoder task failed: {}", e)))?
    }

    fn supported_output_formats(&self) -> Option<&'static [&'static str]> {
        Some(OUTPUT_FORMATS)
    }
}

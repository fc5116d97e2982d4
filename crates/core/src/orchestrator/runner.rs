//! Conversion orchestrator implementation.

use futures::FutureExt;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::{ConversionRequest, UploadedFile};
use super::upload::UploadGuard;
use crate::classifier::{classify, MediaFamily};
use crate::converter::{
    ConversionInput, ConversionOutput, Converter, ConverterConfig, ConverterError,
    FfmpegConverter, ImageConverter, LibreOfficeConverter,
};
use crate::metrics::{CONVERSIONS_TOTAL, CONVERSION_DURATION};

/// Format tokens end up in a file suffix and a response header.
static FORMAT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]{1,16}$").unwrap());

/// Sequences classification, dispatch and cleanup for one request at a time.
///
/// The orchestrator holds no per-request state, so a single instance can
/// serve any number of concurrent requests.
pub struct ConversionOrchestrator {
    document: Arc<dyn Converter>,
    image: Arc<dyn Converter>,
    media: Arc<dyn Converter>,
    timeout: Option<Duration>,
}

impl ConversionOrchestrator {
    /// Creates an orchestrator from explicit adapters, without a timeout.
    pub fn new(
        document: Arc<dyn Converter>,
        image: Arc<dyn Converter>,
        media: Arc<dyn Converter>,
    ) -> Self {
        Self {
            document,
            image,
            media,
            timeout: None,
        }
    }

    /// Creates an orchestrator backed by LibreOffice, the image codecs and FFmpeg.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            Arc::new(LibreOfficeConverter::new(config)),
            Arc::new(ImageConverter::new(config)),
            Arc::new(FfmpegConverter::new(config.clone())),
        )
        .with_timeout(config.timeout())
    }

    /// Sets the per-conversion timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The adapter serving `family`. Video and audio share one adapter.
    pub fn adapter_for(&self, family: MediaFamily) -> Option<&Arc<dyn Converter>> {
        match family {
            MediaFamily::Document => Some(&self.document),
            MediaFamily::Image => Some(&self.image),
            MediaFamily::Video | MediaFamily::Audio => Some(&self.media),
            MediaFamily::Unsupported => None,
        }
    }

    /// Checks every engine and returns the failures by adapter name.
    pub async fn validate(&self) -> Vec<(String, ConverterError)> {
        let mut failures = Vec::new();
        for adapter in [&self.document, &self.image, &self.media] {
            if let Err(e) = adapter.validate().await {
                failures.push((adapter.name().to_string(), e));
            }
        }
        failures
    }

    /// Converts the upload and deletes it afterwards, whatever the outcome.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutput, ConverterError> {
        let start = Instant::now();
        let guard = UploadGuard::new(request.upload);
        let family = classify(&guard.upload().original_name);
        debug!(
            "Classified {} as {}",
            guard.upload().original_name,
            family
        );

        let result = self
            .dispatch(family, guard.upload(), &request.target_format)
            .await;

        guard.release().await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        CONVERSIONS_TOTAL
            .with_label_values(&[family.as_str(), outcome])
            .inc();
        CONVERSION_DURATION
            .with_label_values(&[family.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(output) => info!(
                "Converted {} file to {} in {} ms ({} bytes)",
                family,
                output.format,
                start.elapsed().as_millis(),
                output.bytes.len()
            ),
            Err(e) => warn!(
                "Conversion of {} file to {:?} failed ({}): {}",
                family,
                request.target_format,
                e.kind(),
                e
            ),
        }

        result
    }

    async fn dispatch(
        &self,
        family: MediaFamily,
        upload: &UploadedFile,
        requested_format: &str,
    ) -> Result<ConversionOutput, ConverterError> {
        let adapter = self.adapter_for(family).ok_or_else(|| {
            ConverterError::UnsupportedSourceFormat {
                file_name: upload.original_name.clone(),
            }
        })?;

        let target_format = normalize_format(requested_format)?;

        let input = ConversionInput {
            path: upload.path.clone(),
            file_name: upload.original_name.clone(),
            size_bytes: upload.size_bytes,
            family,
            target_format: target_format.clone(),
        };

        debug!(
            "Dispatching {} to {} adapter as {}",
            input.file_name,
            adapter.name(),
            target_format
        );

        let call = AssertUnwindSafe(adapter.convert(&input)).catch_unwind();
        let settled = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ConverterError::Timeout {
                    timeout_secs: limit.as_secs(),
                }
            })?,
            None => call.await,
        };

        let bytes = settled.map_err(|panic| {
            ConverterError::unexpected(format!(
                "{} adapter panicked: {}",
                adapter.name(),
                panic_message(panic.as_ref())
            ))
        })??;

        Ok(ConversionOutput {
            bytes,
            format: target_format,
            family,
        })
    }
}

/// Trims and lowercases a format token, dropping a leading dot.
pub fn normalize_format(raw: &str) -> Result<String, ConverterError> {
    let token = raw.trim().trim_start_matches('.').to_lowercase();
    if FORMAT_TOKEN.is_match(&token) {
        Ok(token)
    } else {
        Err(ConverterError::InvalidTargetFormat {
            format: raw.to_string(),
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

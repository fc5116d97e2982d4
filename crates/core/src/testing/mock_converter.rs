//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::classifier::MediaFamily;
use crate::converter::{ConversionInput, Converter, ConverterError};

/// A recorded conversion call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// Original filename the upload arrived under.
    pub file_name: String,
    /// Family the orchestrator classified the upload as.
    pub family: MediaFamily,
    /// Normalized target format passed to the adapter.
    pub target_format: String,
    /// Whether the stored upload was on disk when the adapter was called.
    pub input_existed: bool,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion calls for assertions
/// - Simulate success with fixed output bytes, or failure
/// - Simulate slow engines and panicking adapters
///
/// Clones share state, so a test can keep a handle after moving one into
/// an orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use transmute_core::testing::MockConverter;
///
/// let image = MockConverter::named("image");
/// image.set_output(b"\x89PNG".to_vec()).await;
///
/// let orchestrator = ConversionOrchestrator::new(
///     Arc::new(MockConverter::new()),
///     Arc::new(image.clone()),
///     Arc::new(MockConverter::new()),
/// );
/// orchestrator.convert(request).await?;
///
/// assert_eq!(image.conversion_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    name: String,
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Bytes returned on success. Defaults to `converted:<format>`.
    output: Arc<RwLock<Option<Vec<u8>>>>,
    /// If set, the next conversion will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// If set, `validate` fails with this error.
    validate_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration.
    delay: Arc<RwLock<Duration>>,
    /// Panic instead of converting.
    panic: Arc<RwLock<bool>>,
    /// Fail when the upload is missing from disk.
    require_input: Arc<RwLock<bool>>,
    /// Delete the upload before returning, to exercise cleanup of a vanished file.
    delete_input: Arc<RwLock<bool>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a mock reporting `name` as its adapter name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conversions: Arc::new(RwLock::new(Vec::new())),
            output: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            panic: Arc::new(RwLock::new(false)),
            require_input: Arc::new(RwLock::new(false)),
            delete_input: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Set the bytes returned by successful conversions.
    pub async fn set_output(&self, bytes: Vec<u8>) {
        *self.output.write().await = Some(bytes);
    }

    /// Configure the next conversion to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure `validate` to fail with the given error.
    pub async fn set_validate_error(&self, error: ConverterError) {
        *self.validate_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Make conversions panic.
    pub async fn set_panic(&self, panic: bool) {
        *self.panic.write().await = panic;
    }

    /// Fail conversions whose upload is not on disk.
    pub async fn set_require_input(&self, require: bool) {
        *self.require_input.write().await = require;
    }

    /// Delete the upload during conversion.
    pub async fn set_delete_input(&self, delete: bool) {
        *self.delete_input.write().await = delete;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn convert(&self, input: &ConversionInput) -> Result<Vec<u8>, ConverterError> {
        let input_existed = tokio::fs::try_exists(&input.path).await.unwrap_or(false);
        let error = self.take_error().await;

        self.conversions.write().await.push(RecordedConversion {
            file_name: input.file_name.clone(),
            family: input.family,
            target_format: input.target_format.clone(),
            input_existed,
            success: error.is_none(),
        });

        // Simulate conversion time
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if *self.panic.read().await {
            panic!("mock {} converter panicked", self.name);
        }

        if *self.delete_input.read().await {
            let _ = tokio::fs::remove_file(&input.path).await;
        }

        if let Some(err) = error {
            return Err(err);
        }

        if *self.require_input.read().await && !input_existed {
            return Err(ConverterError::unexpected(format!(
                "upload {} missing during conversion",
                input.path.display()
            )));
        }

        Ok(self
            .output
            .read()
            .await
            .clone()
            .unwrap_or_else(|| format!("converted:{}", input.target_format).into_bytes()))
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        match self.validate_error.read().await.as_ref() {
            Some(err) => Err(ConverterError::engine_failure("mock", err.to_string())),
            None => Ok(()),
        }
    }
}

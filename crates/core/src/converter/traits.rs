//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::ConversionInput;

/// An adapter around one external conversion engine.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts the input file to `input.target_format` and returns the bytes.
    ///
    /// The input file must not be deleted by the adapter; the caller owns it.
    async fn convert(&self, input: &ConversionInput) -> Result<Vec<u8>, ConverterError>;

    /// Validates that the underlying engine is available.
    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }

    /// Output formats this adapter accepts, or `None` when the engine decides.
    fn supported_output_formats(&self) -> Option<&'static [&'static str]> {
        None
    }
}

//! Conversion orchestrator.
//!
//! The orchestrator owns the lifecycle of one upload:
//! - **Classify**: the original filename decides the media family
//! - **Dispatch**: the family's adapter converts the stored upload
//! - **Cleanup**: the upload is deleted on every path, including panics,
//!   timeouts and dropped requests

mod runner;
mod types;
mod upload;

pub use runner::{normalize_format, ConversionOrchestrator};
pub use types::{ConversionRequest, UploadedFile};
pub use upload::UploadGuard;

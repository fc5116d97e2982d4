//! `POST /convert`: multipart upload in, converted artifact out.
//!
//! The `file` field is streamed chunk by chunk into the upload directory under
//! a random name, so large media never sits in memory. From the moment the file
//! exists it is owned by an [`UploadGuard`]; a malformed form or a dropped
//! connection deletes it before the orchestrator ever sees it.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use transmute_core::{ConversionRequest, ConverterError, UploadGuard, UploadedFile};

use crate::metrics::UPLOAD_SIZE_BYTES;
use crate::state::AppState;

/// Every failure of the conversion endpoint becomes a 500 with a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("{0}")]
    Rejected(#[from] MultipartRejection),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Conversion(#[from] ConverterError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match &self {
            // The orchestrator has already logged the outcome
            ApiError::Conversion(_) => debug!("Conversion request failed: {}", message),
            _ => warn!("Conversion request failed: {}", message),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

/// POST /convert
///
/// Form fields: `file` (the upload) and `format` (target format token).
pub async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart?;
    let upload_dir = &state.config().uploads.dir;

    let mut upload: Option<(UploadGuard, u64)> = None;
    let mut format: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(ApiError::UnexpectedField(name));
                }
                let original_name = field.file_name().unwrap_or("").to_string();
                let path = upload_dir.join(Uuid::new_v4().simple().to_string());

                let mut file = tokio::fs::File::create(&path).await?;
                let guard = UploadGuard::new(UploadedFile::new(path, original_name, 0));
                let size = store_field(&mut field, &mut file, &guard.upload().path).await?;
                upload = Some((guard, size));
            }
            "format" => format = Some(field.text().await?),
            _ => debug!("Ignoring multipart field {:?}", name),
        }
    }

    let Some((guard, size_bytes)) = upload else {
        return Err(ApiError::NoFile);
    };
    UPLOAD_SIZE_BYTES.observe(size_bytes as f64);

    let mut file = guard.into_upload();
    file.size_bytes = size_bytes;
    let request = ConversionRequest::new(file, format.unwrap_or_default());

    let output = state.orchestrator().convert(request).await?;

    let content_type = header_value(&output.content_type())?;
    let disposition = header_value(&format!("attachment; filename=\"{}\"", output.file_name()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        output.bytes,
    )
        .into_response())
}

/// Copies the field body into `file` and returns the number of bytes written.
async fn store_field(
    field: &mut Field<'_>,
    file: &mut tokio::fs::File,
    path: &Path,
) -> Result<u64, ApiError> {
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    debug!("Stored upload {} ({} bytes)", path.display(), written);
    Ok(written)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Internal(format!("Invalid header value {:?}: {}", value, e)))
}

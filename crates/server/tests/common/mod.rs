//! Common test utilities for in-process HTTP testing with mocks.
//!
//! This module provides a test fixture that builds the router around a
//! temporary upload directory, with mock adapters injected so tests do not
//! need LibreOffice or FFmpeg installed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use transmute_core::{
    testing::MockConverter, Config, ConversionOrchestrator, Converter, ImageConverter,
    ServerConfig, UploadConfig,
};

/// Re-export fixtures for test convenience
pub use transmute_core::testing::fixtures;

const BOUNDARY: &str = "transmute-test-boundary-7MA4YWxkTrZu0gW";

/// Test fixture for HTTP testing with mock adapters.
///
/// Provides an in-process router with controllable adapters for:
/// - Documents (MockConverter)
/// - Images (real ImageConverter unless `TestConfig::mock_images` is set)
/// - Video and audio (MockConverter)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new().await;
///
///     let form = MultipartForm::new()
///         .file("file", "photo.png", &fixtures::sample_png())
///         .text("format", "jpg");
///     let response = fixture.post_form("/convert", form).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock document adapter
    pub document: MockConverter,
    /// Mock image adapter (only used with `TestConfig::mock_images`)
    pub image: MockConverter,
    /// Mock media adapter - shared by video and audio
    pub media: MockConverter,
    /// Temporary directory holding the upload directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Use a mock for images instead of the real codecs
    pub mock_images: bool,
    /// Request body limit
    pub max_size_bytes: u64,
    /// Allow any origin
    pub cors_permissive: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mock_images: false,
            max_size_bytes: 16 * 1024 * 1024,
            cors_permissive: true,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("Failed to create upload dir");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                cors_permissive: test_config.cors_permissive,
            },
            uploads: UploadConfig {
                dir: upload_dir,
                max_size_bytes: test_config.max_size_bytes,
            },
            ..Default::default()
        };

        let document = MockConverter::named("document");
        let image = MockConverter::named("image");
        let media = MockConverter::named("media");

        let image_adapter: Arc<dyn Converter> = if test_config.mock_images {
            Arc::new(image.clone())
        } else {
            Arc::new(ImageConverter::new(&config.converter))
        };
        let orchestrator = ConversionOrchestrator::new(
            Arc::new(document.clone()),
            image_adapter,
            Arc::new(media.clone()),
        );

        let state = Arc::new(transmute_server::state::AppState::new(
            config,
            Arc::new(orchestrator),
        ));
        let router = transmute_server::api::create_router(state);

        Self {
            router,
            document,
            image,
            media,
            temp_dir,
        }
    }

    /// Names of files left in the upload directory.
    pub fn stored_uploads(&self) -> Vec<String> {
        std::fs::read_dir(self.temp_dir.path().join("uploads"))
            .expect("upload dir should exist")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart form.
    pub async fn post_form(&self, path: &str, form: MultipartForm) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", form.content_type())
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with custom content type (for testing wrong content types).
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Minimal `multipart/form-data` encoder.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file part.
    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

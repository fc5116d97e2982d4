//! HTTP tests for the conversion endpoint.
//!
//! These drive the router in-process and check the response contract:
//! 200 with the artifact and download headers, or 500 with a plain-text
//! message, and in every case an empty upload directory afterwards.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::ImageFormat;

use common::{fixtures, MultipartForm, TestConfig, TestFixture};
use transmute_core::{ConverterError, MediaFamily};

#[tokio::test]
async fn test_png_to_jpg() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "photo.png", &fixtures::sample_png())
        .text("format", "jpg");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.header("content-type"), Some("application/jpg"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"converted.jpg\"")
    );
    assert_eq!(image::guess_format(&response.body).unwrap(), ImageFormat::Jpeg);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_format_field_before_file() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .text("format", "png")
        .file("file", "Holiday.JPG", &fixtures::sample_image(ImageFormat::Jpeg, 12, 9));
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.header("content-type"), Some("application/png"));
    let decoded = image::load_from_memory(&response.body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 9));
}

#[tokio::test]
async fn test_unknown_extension() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "notes.xyz", b"whatever")
        .text("format", "pdf");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Неподдерживаемый формат");
    assert_eq!(
        response.header("content-type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(fixture.document.conversion_count().await, 0);
    assert_eq!(fixture.media.conversion_count().await, 0);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_unsupported_image_target() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "photo.png", &fixtures::sample_png())
        .text("format", "bmp");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Неподдерживаемый формат изображения");
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_engine_failure_message_is_returned() {
    let fixture = TestFixture::new().await;
    fixture
        .media
        .set_next_error(ConverterError::engine_failure(
            "ffmpeg",
            "Invalid data found when processing input",
        ))
        .await;

    let form = MultipartForm::new()
        .file("file", "song.mp3", b"not really an mp3")
        .text("format", "ogg");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Invalid data found when processing input");
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_media_conversion_uses_shared_adapter() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "clip.MKV", b"matroska bytes")
        .text("format", "mp4");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), b"converted:mp4");
    assert_eq!(response.header("content-type"), Some("application/mp4"));

    let calls = fixture.media.recorded_conversions().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].family, MediaFamily::Video);
    assert_eq!(calls[0].file_name, "clip.MKV");
    assert!(calls[0].input_existed);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_repeated_requests_get_identical_headers() {
    let fixture = TestFixture::new().await;

    let mut responses = Vec::new();
    for _ in 0..2 {
        let form = MultipartForm::new()
            .file("file", "report.docx", b"PK docx")
            .text("format", "pdf");
        responses.push(fixture.post_form("/convert", form).await);
    }

    assert_eq!(responses[0].status, StatusCode::OK);
    assert_eq!(responses[1].status, StatusCode::OK);
    assert_eq!(
        responses[0].header("content-disposition"),
        responses[1].header("content-disposition")
    );
    assert_eq!(
        responses[0].header("content-disposition"),
        Some("attachment; filename=\"converted.pdf\"")
    );
    assert_eq!(fixture.document.conversion_count().await, 2);
}

#[tokio::test]
async fn test_missing_file_field() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new().text("format", "png");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "No file uploaded");
}

#[tokio::test]
async fn test_missing_format_field_cleans_upload() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new().file("file", "photo.png", &fixtures::sample_png());
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().starts_with("Invalid target format"));
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_header_injection_is_rejected() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "report.txt", b"hello")
        .text("format", "pdf\"; filename=\"evil.exe");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fixture.document.conversion_count().await, 0);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_second_file_field_is_rejected() {
    let fixture = TestFixture::new().await;

    let form = MultipartForm::new()
        .file("file", "a.png", &fixtures::sample_png())
        .file("file", "b.png", &fixtures::sample_png())
        .text("format", "gif");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Unexpected field: file");
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_not_multipart() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_with_content_type("/convert", "{\"format\":\"png\"}", "application/json")
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.header("content-type"),
        Some("text/plain; charset=utf-8")
    );
}

#[tokio::test]
async fn test_body_limit_discards_partial_upload() {
    let fixture = TestFixture::with_config(TestConfig {
        max_size_bytes: 1024,
        ..Default::default()
    })
    .await;

    let form = MultipartForm::new()
        .text("format", "mp3")
        .file("file", "song.wav", &vec![0u8; 64 * 1024]);
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fixture.media.conversion_count().await, 0);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_adapter_panic_is_a_500() {
    let fixture = TestFixture::with_config(TestConfig {
        mock_images: true,
        ..Default::default()
    })
    .await;
    fixture.image.set_panic(true).await;

    let form = MultipartForm::new()
        .file("file", "photo.webp", b"RIFF....WEBP")
        .text("format", "png");
    let response = fixture.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("panicked"));
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_concurrent_requests() {
    let fixture = TestFixture::new().await;
    fixture.media.set_delay(Duration::from_millis(25)).await;

    let requests = (0..8).map(|i| {
        let form = MultipartForm::new()
            .file("file", &format!("track-{}.flac.wav", i), b"RIFF")
            .text("format", "mp3");
        fixture.post_form("/convert", form)
    });
    let responses = futures::future::join_all(requests).await;

    for response in responses {
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), b"converted:mp3");
    }
    assert_eq!(fixture.media.conversion_count().await, 8);
    assert!(fixture.stored_uploads().is_empty());
}

#[tokio::test]
async fn test_cors_preflight() {
    let fixture = TestFixture::new().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/convert")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = fixture.send(request).await;

    assert!(response.status.is_success());
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_cors_disabled() {
    let fixture = TestFixture::with_config(TestConfig {
        cors_permissive: false,
        ..Default::default()
    })
    .await;

    let response = fixture.get("/health").await;
    assert!(response.header("access-control-allow-origin").is_none());
}

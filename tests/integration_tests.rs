//! Integration tests driving the router end to end.
//!
//! The image endpoint is exercised for real (the adapter is in-process).
//! The PDF and video endpoints are exercised on their failure paths with
//! corrupt input, which must produce a clean JSON error whether or not
//! the external binary is installed.

use std::io::Cursor;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::ImageOutputFormat;
use tower::ServiceExt;

use squish::{app, Config};

const BOUNDARY: &str = "squish-test-boundary";

fn test_app(scratch: &Path) -> Router {
    let config = Config {
        scratch_dir: scratch.to_path_buf(),
        ..Config::default()
    };
    app(config)
}

fn multipart_request(
    uri: &str,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .unwrap();
    out
}

fn scratch_is_empty(scratch: &Path) -> bool {
    std::fs::read_dir(scratch).unwrap().next().is_none()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_root_liveness() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(body, b"File Compressor Backend Running");
}

#[tokio::test]
async fn test_health_endpoint() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["status"].is_string());
    assert_eq!(body["adapters"]["image"], true);
}

#[tokio::test]
async fn test_ui_page_served() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(Request::builder().uri("/app").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("Multi-File Compressor"));
}

#[tokio::test]
async fn test_image_compression_roundtrip() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let png = sample_png(1200, 900);
    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "photo.png",
            Some("image/png"),
            &png,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );

    let body = body_bytes(response).await;
    assert!(!body.is_empty());

    // The output really is a JPEG, downscaled to the configured width.
    let format = image::guess_format(&body).unwrap();
    assert_eq!(format, image::ImageFormat::Jpeg);
    let img = image::load_from_memory(&body).unwrap();
    assert_eq!(img.width(), 800);

    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_small_image_not_upscaled() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let png = sample_png(320, 240);
    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "thumb.png",
            Some("image/png"),
            &png,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let img = image::load_from_memory(&body).unwrap();
    assert_eq!(img.width(), 320);
    assert_eq!(img.height(), 240);
}

#[tokio::test]
async fn test_image_decodes_without_filename_extension() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    // Decoding must not depend on a path extension: the spooled scratch
    // file has none, and neither does this upload's name.
    let png = sample_png(640, 480);
    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "photo",
            Some("image/png"),
            &png,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(
        image::guess_format(&body).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[tokio::test]
async fn test_oversize_upload_rejected_with_413() {
    let scratch = tempfile::tempdir().unwrap();
    let config = Config {
        scratch_dir: scratch.path().to_path_buf(),
        max_file_size_mb: 1,
        ..Config::default()
    };
    let app = app(config);

    // Just over the 1MB per-file limit, well under the body limit.
    let oversized = vec![0u8; 1024 * 1024 + 4096];
    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "big.png",
            Some("image/png"),
            &oversized,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_stalled_tool_times_out() {
    use std::os::unix::fs::PermissionsExt;

    let scratch = tempfile::tempdir().unwrap();
    let tool_dir = tempfile::tempdir().unwrap();

    // Stand-in tool that hangs regardless of its arguments.
    let stall = tool_dir.path().join("stall.sh");
    std::fs::write(&stall, "#!/bin/sh\nsleep 60\n").unwrap();
    std::fs::set_permissions(&stall, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = Config {
        scratch_dir: scratch.path().to_path_buf(),
        ghostscript_bin: stall.to_string_lossy().into_owned(),
        tool_timeout_seconds: 1,
        ..Config::default()
    };
    let app = app(config);

    let response = app
        .oneshot(multipart_request(
            "/compress/pdf",
            "doc.pdf",
            Some("application/pdf"),
            b"%PDF-1.4 stub",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["code"], "COMPRESSION_TIMEOUT");

    // The killed job's input and output temp files are both reclaimed.
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_unsupported_type_rejected_without_scratch_file() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "notes.txt",
            Some("text/plain"),
            b"hello world",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["error"].is_string());

    // Rejection happens before anything is spooled.
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_kind_must_match_endpoint() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    // A valid image posted to the PDF endpoint is a client error.
    let png = sample_png(100, 100);
    let response = app
        .oneshot(multipart_request(
            "/compress/pdf",
            "photo.png",
            Some("image/png"),
            &png,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_missing_file_field() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/compress/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_empty_file_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "photo.png",
            Some("image/png"),
            b"",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_corrupt_image_fails_cleanly() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(multipart_request(
            "/compress/image",
            "photo.png",
            Some("image/png"),
            b"this is not image data at all",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Compression failed");
    assert_eq!(body["code"], "COMPRESSION_FAILED");

    // Failure paths must not leak temp files either.
    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_corrupt_pdf_fails_cleanly() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    // Fails whether Ghostscript is installed (non-zero exit on garbage)
    // or missing (spawn failure); either way the contract is the same.
    let response = app
        .oneshot(multipart_request(
            "/compress/pdf",
            "doc.pdf",
            Some("application/pdf"),
            b"definitely not a pdf",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "PDF compression failed");

    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_corrupt_video_fails_cleanly() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let response = app
        .oneshot(multipart_request(
            "/compress/video",
            "clip.mp4",
            Some("video/mp4"),
            b"definitely not an mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Video compression failed");

    assert!(scratch_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_concurrent_requests_do_not_interfere() {
    let scratch = tempfile::tempdir().unwrap();
    let app = test_app(scratch.path());

    let png = sample_png(1000, 700);
    let image_req = multipart_request("/compress/image", "photo.png", Some("image/png"), &png);
    let pdf_req = multipart_request(
        "/compress/pdf",
        "doc.pdf",
        Some("application/pdf"),
        b"not a pdf",
    );

    let (image_res, pdf_res) = tokio::join!(
        app.clone().oneshot(image_req),
        app.clone().oneshot(pdf_req)
    );

    let image_res = image_res.unwrap();
    let pdf_res = pdf_res.unwrap();

    // The image job succeeds regardless of what the PDF job did.
    assert_eq!(image_res.status(), StatusCode::OK);
    let body = body_bytes(image_res).await;
    assert!(image::load_from_memory(&body).is_ok());

    assert_eq!(pdf_res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Nothing left behind by either request.
    assert!(scratch_is_empty(scratch.path()));
}

//! HTTP contract tests for the detection endpoints.
//!
//! These run the real router over a stub detection pipeline, so they cover
//! request validation, error bodies, and response shapes without model files.

use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use serde_json::{json, Value};
use tower::ServiceExt;

use visage_api::{create_router, AppState, ServiceConfig};
use visage_engine::{
    Detection, EngineResult, FaceAnalyzer, FaceAttributes, FaceDetector, FaceEngine,
};
use visage_models::{DetectorKind, FaceBox, FaceLandmarks};

struct StubDetector {
    detections: Vec<Detection>,
    capable: bool,
}

impl FaceDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn confidence_capable(&self) -> bool {
        self.capable
    }

    fn detect(&self, _image: &DynamicImage) -> EngineResult<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

struct FailingDetector;

impl FaceDetector for FailingDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn confidence_capable(&self) -> bool {
        false
    }

    fn detect(&self, _image: &DynamicImage) -> EngineResult<Vec<Detection>> {
        Err(visage_engine::EngineError::detection_failed(
            "inference aborted",
        ))
    }
}

struct StubAnalyzer;

impl FaceAnalyzer for StubAnalyzer {
    fn analyze(
        &self,
        _image: &DynamicImage,
        _detection: &Detection,
    ) -> EngineResult<FaceAttributes> {
        Ok(FaceAttributes {
            landmarks: FaceLandmarks {
                chin: vec![[1, 2]; 17],
                ..Default::default()
            },
            descriptor: vec![0.5; 128],
        })
    }
}

fn detection(top: i64, right: i64, bottom: i64, left: i64, confidence: f32) -> Detection {
    Detection {
        bounds: FaceBox::from_edges(top, right, bottom, left),
        confidence,
    }
}

fn stub_app(kind: DetectorKind, capable: bool, detections: Vec<Detection>) -> Router {
    let engine = FaceEngine::from_parts(
        Box::new(StubDetector {
            detections,
            capable,
        }),
        Box::new(StubAnalyzer),
        kind,
        2000,
    );
    create_router(AppState::with_engine(ServiceConfig::default(), engine))
}

fn one_face_app() -> Router {
    stub_app(
        DetectorKind::Hog,
        false,
        vec![detection(10, 40, 40, 10, 1.0)],
    )
}

fn write_png(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let img = image::RgbImage::from_pixel(64, 48, image::Rgb([180, 170, 160]));
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), 64, 48, ExtendedColorType::Rgb8)
        .expect("encode png");
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write png");
    path
}

async fn send_json(app: Router, uri: &str, body: String) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("build request"),
    )
    .await
    .expect("send request")
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

#[tokio::test]
async fn test_health_reports_active_backend() {
    let app = stub_app(DetectorKind::Hog, false, Vec::new());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["service"], "visage-face-detection");
    assert_eq!(json["model"], "hog");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["confidence_scores"], false);
}

#[tokio::test]
async fn test_health_reports_confidence_capability() {
    let app = stub_app(DetectorKind::Cnn, true, Vec::new());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");

    let json = body_json(response).await;
    assert_eq!(json["model"], "cnn");
    assert_eq!(json["confidence_scores"], true);
}

#[tokio::test]
async fn test_detect_rejects_non_json_body() {
    let app = one_face_app();

    let response = send_json(app.clone(), "/detect", "not json at all".to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Request body must be JSON");
    assert_eq!(json.as_object().unwrap().len(), 1);

    // Valid JSON of the wrong shape gets the same treatment
    let response = send_json(app, "/detect", "[1, 2, 3]".to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Request body must be JSON");
}

#[tokio::test]
async fn test_detect_requires_both_fields() {
    let app = one_face_app();

    for body in [
        json!({}),
        json!({"fileId": "abc"}),
        json!({"filePath": "/tmp/p.png"}),
        json!({"fileId": "", "filePath": "/tmp/p.png"}),
        json!({"fileId": "abc", "filePath": ""}),
    ] {
        let response = send_json(app.clone(), "/detect", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required fields: fileId, filePath");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_detect_missing_file_is_404() {
    let app = one_face_app();
    let body = json!({"fileId": "abc", "filePath": "/nonexistent/photo.png"});

    let response = send_json(app, "/detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File not found: /nonexistent/photo.png");
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_detect_unreadable_image_is_400() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"definitely not an image").expect("write file");

    let app = one_face_app();
    let body = json!({"fileId": "abc", "filePath": path.to_str().unwrap()});

    let response = send_json(app, "/detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let message = json["error"].as_str().expect("error string");
    assert!(message.starts_with("Failed to load image: "), "{message}");
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_detect_success_shape() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(&dir, "faces.png");

    let app = stub_app(
        DetectorKind::Cnn,
        true,
        vec![
            detection(10, 40, 40, 10, 0.98765),
            detection(5, 60, 30, 45, 0.75),
        ],
    );
    let body = json!({"fileId": "photo-1", "filePath": path.to_str().unwrap()});

    let response = send_json(app, "/detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["fileId"], "photo-1");
    assert_eq!(json["faceCount"], 2);
    assert!(json["processingTimeMs"].is_u64());

    let faces = json["faces"].as_array().expect("faces array");
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[0]["id"], "photo-1-face-0");
    assert_eq!(faces[1]["id"], "photo-1-face-1");

    let bounds = &faces[0]["box"];
    assert_eq!(bounds["top"], 10);
    assert_eq!(bounds["right"], 40);
    assert_eq!(bounds["bottom"], 40);
    assert_eq!(bounds["left"], 10);
    assert_eq!(bounds["width"], 30);
    assert_eq!(bounds["height"], 30);

    assert_eq!(faces[0]["descriptor"].as_array().unwrap().len(), 128);
    assert_eq!(faces[0]["landmarks"]["chin"].as_array().unwrap().len(), 17);
    // Confidence rounded to 3 decimals
    assert_eq!(faces[0]["confidence"], 0.988);
}

#[tokio::test]
async fn test_detect_engine_failure_is_500() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(&dir, "unlucky.png");

    let engine = FaceEngine::from_parts(
        Box::new(FailingDetector),
        Box::new(StubAnalyzer),
        DetectorKind::Hog,
        2000,
    );
    let app = create_router(AppState::with_engine(ServiceConfig::default(), engine));
    let body = json!({"fileId": "abc", "filePath": path.to_str().unwrap()});

    let response = send_json(app, "/detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Face detection failed");
    assert_eq!(json["message"], "inference aborted");
    assert!(json["processingTimeMs"].is_u64());
    assert_eq!(json.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_detect_zero_faces_is_success() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(&dir, "landscape.png");

    let app = stub_app(DetectorKind::Hog, false, Vec::new());
    let body = json!({"fileId": "empty-1", "filePath": path.to_str().unwrap()});

    let response = send_json(app, "/detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["fileId"], "empty-1");
    assert_eq!(json["faceCount"], 0);
    assert_eq!(json["faces"], json!([]));
}

#[tokio::test]
async fn test_detect_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(&dir, "same.png");

    let app = one_face_app();
    let body = json!({"fileId": "repeat", "filePath": path.to_str().unwrap()});

    let first = body_json(send_json(app.clone(), "/detect", body.to_string()).await).await;
    let second = body_json(send_json(app, "/detect", body.to_string()).await).await;
    assert_eq!(first["faces"], second["faces"]);
    assert_eq!(first["faceCount"], second["faceCount"]);
}

#[tokio::test]
async fn test_batch_requires_photos() {
    let app = one_face_app();

    // An explicit `"photos": null` counts as missing, not as a malformed body
    for body in [json!({}), json!({"photos": []}), json!({"photos": null})] {
        let response = send_json(app.clone(), "/batch-detect", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No photos provided");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_batch_isolates_per_photo_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_png(&dir, "one.png");
    let third = write_png(&dir, "three.png");

    let app = one_face_app();
    let body = json!({"photos": [
        {"fileId": "p0", "filePath": first.to_str().unwrap()},
        {"fileId": "p1", "filePath": "/nonexistent/two.png"},
        {"fileId": "p2", "filePath": third.to_str().unwrap()},
    ]});

    let response = send_json(app, "/batch-detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["totalPhotos"], 3);
    assert_eq!(json["totalFaces"], 2);
    assert!(json["processingTimeMs"].is_u64());

    let results = json["results"].as_array().expect("results array");
    assert_eq!(results.len(), 3);

    // Successful entries carry faces and no error key
    assert_eq!(results[0]["fileId"], "p0");
    assert!(results[0].get("error").is_none());
    assert_eq!(results[0]["faceCount"], 1);
    assert_eq!(results[0]["faces"][0]["id"], "p0-face-0");
    assert!(results[0].get("processingTimeMs").is_none());

    // The failed entry reports the error without aborting the batch
    assert_eq!(results[1]["fileId"], "p1");
    assert_eq!(results[1]["error"], "File not found");
    assert_eq!(results[1]["faces"], json!([]));
    assert_eq!(results[1]["faceCount"], 0);

    assert_eq!(results[2]["fileId"], "p2");
    assert!(results[2].get("error").is_none());
}

#[tokio::test]
async fn test_batch_reports_missing_fields_per_item() {
    let dir = tempfile::tempdir().expect("tempdir");
    let valid = write_png(&dir, "ok.png");

    let app = one_face_app();
    let body = json!({"photos": [
        {"filePath": "/tmp/no-id.png"},
        {"fileId": "named-but-pathless"},
        {"fileId": "", "filePath": "/tmp/empty-id.png"},
        {"fileId": "good", "filePath": valid.to_str().unwrap()},
    ]});

    let response = send_json(app, "/batch-detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let results = json["results"].as_array().expect("results array");
    assert_eq!(results[0]["fileId"], "unknown");
    assert_eq!(results[0]["error"], "Missing fileId or filePath");
    assert_eq!(results[1]["fileId"], "named-but-pathless");
    assert_eq!(results[1]["error"], "Missing fileId or filePath");
    assert_eq!(results[2]["fileId"], "unknown");
    assert_eq!(json["totalPhotos"], 4);
    assert_eq!(json["totalFaces"], 1);
}

#[tokio::test]
async fn test_batch_unreadable_image_becomes_entry_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"garbage bytes").expect("write file");

    let app = one_face_app();
    let body = json!({"photos": [
        {"fileId": "bad", "filePath": path.to_str().unwrap()},
    ]});

    let response = send_json(app, "/batch-detect", body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let entry = &json["results"][0];
    assert_eq!(entry["fileId"], "bad");
    let message = entry["error"].as_str().expect("error string");
    assert!(message.starts_with("Failed to load image: "), "{message}");
    assert_eq!(json["totalFaces"], 0);
}

#[tokio::test]
async fn test_batch_malformed_body_is_500() {
    let app = one_face_app();

    let response = send_json(app, "/batch-detect", "{broken".to_string()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Batch detection failed");
    assert!(json["message"].is_string());
    assert!(json.get("processingTimeMs").is_none());
}

#[tokio::test]
async fn test_batch_null_item_is_500() {
    let app = one_face_app();
    let body = r#"{"photos": [null]}"#.to_string();

    let response = send_json(app, "/batch-detect", body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Batch detection failed");
}

#[test]
fn test_state_exposes_bind_config() {
    let config = ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 9100,
        ..ServiceConfig::default()
    };
    let engine = FaceEngine::from_parts(
        Box::new(StubDetector {
            detections: Vec::new(),
            capable: false,
        }),
        Box::new(StubAnalyzer),
        DetectorKind::Hog,
        2000,
    );

    // main binds on the host/port carried by the state
    let state = AppState::with_engine(config, engine);
    assert_eq!(state.config.host, "127.0.0.1");
    assert_eq!(state.config.port, 9100);
}

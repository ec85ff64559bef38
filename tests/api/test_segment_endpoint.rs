// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /segment/{category} and GET /segment/categories

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cloth_segm_node::api::errors::DECODE_FAILED_MESSAGE;
use cloth_segm_node::api::{create_app, AppState};
use cloth_segm_node::segmentation::{SegmentationModel, SegmentationService};
use image::RgbaImage;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::common::{
    jpeg, multipart_body, multipart_content_type, png, FailingSegmentationModel,
    FakeSegmentationModel,
};

fn app_with(model: impl SegmentationModel + 'static) -> Router {
    let service = SegmentationService::new(Arc::new(model));
    create_app(AppState::new(Arc::new(service)))
}

fn upload(category: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/segment/{}", category))
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn error_message(response: axum::response::Response) -> String {
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    json["error"].as_str().unwrap().to_string()
}

fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[tokio::test]
async fn test_top_returns_png_of_original_size() {
    let app = app_with(FakeSegmentationModel::uniform(16, 1));
    let body = multipart_body("file", Some("shirt.jpg"), &jpeg(120, 80));

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let image = decode_png(&body_bytes(response).await);
    assert_eq!(image.dimensions(), (120, 80));
    assert!(image.pixels().all(|p| p[3] == 255));
}

#[tokio::test]
async fn test_category_selects_classes() {
    // Every pixel is upper-body; kurta keeps only full-body
    let app = app_with(FakeSegmentationModel::uniform(16, 1));
    let body = multipart_body("file", Some("shirt.png"), &png(40, 40));

    let response = app.oneshot(upload("kurta", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let image = decode_png(&body_bytes(response).await);
    assert!(image.pixels().all(|p| p[3] == 0));
}

#[tokio::test]
async fn test_lehenga_keeps_upper_and_full_body() {
    let app = app_with(FakeSegmentationModel::from_fn(32, |x, _| if x < 16 { 1 } else { 3 }));
    let body = multipart_body("file", Some("lehenga.png"), &png(64, 64));

    let response = app.oneshot(upload("lehenga", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let image = decode_png(&body_bytes(response).await);
    assert!(image.pixels().all(|p| p[3] == 255));
}

#[tokio::test]
async fn test_category_match_is_exact() {
    let app = app_with(FakeSegmentationModel::uniform(8, 2));

    for category in ["Skirt", "%20top", "KURTA"] {
        let body = multipart_body("file", Some("skirt.png"), &png(10, 10));
        let response = app.clone().oneshot(upload(category, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", category);
    }
}

#[tokio::test]
async fn test_unknown_category_is_404() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let body = multipart_body("file", Some("hat.png"), &png(10, 10));

    let response = app.oneshot(upload("saree", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(error_message(response).await.contains("saree"));
}

#[tokio::test]
async fn test_missing_file_part() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let body = multipart_body("image", Some("shirt.png"), &png(10, 10));

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No file part");
}

#[tokio::test]
async fn test_file_field_without_filename_is_not_a_file() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let body = multipart_body("file", None, b"plain form value");

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No file part");
}

#[tokio::test]
async fn test_empty_filename() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let body = multipart_body("file", Some(""), b"");

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No selected file");
}

#[tokio::test]
async fn test_non_multipart_body() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/segment/top")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "shirt.png"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No file part");
}

#[tokio::test]
async fn test_corrupt_upload_is_500_json() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let body = multipart_body("file", Some("broken.jpg"), b"\xFF\xD8\xFF\xE0 definitely not a jpeg");

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(response).await, DECODE_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_inference_failure_is_500_json() {
    let app = app_with(FailingSegmentationModel);
    let body = multipart_body("file", Some("shirt.png"), &png(10, 10));

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = error_message(response).await;
    assert!(!message.is_empty());
    assert!(!message.contains("session exploded"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let service = SegmentationService::new(Arc::new(FakeSegmentationModel::uniform(8, 1)));
    let app = create_app(AppState::new(Arc::new(service)).with_max_upload_bytes(1024));
    let body = multipart_body("file", Some("huge.bin"), &vec![0u8; 64 * 1024]);

    let response = app.oneshot(upload("top", body)).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_get_on_segment_route_is_not_allowed() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/segment/top")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_categories_listing() {
    let app = app_with(FakeSegmentationModel::uniform(8, 1));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/segment/categories")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let table: Vec<(String, Vec<u64>)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["name"].as_str().unwrap().to_string(),
                row["classes"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|c| c.as_u64().unwrap())
                    .collect(),
            )
        })
        .collect();

    assert_eq!(
        table,
        vec![
            ("top".to_string(), vec![1]),
            ("bottom".to_string(), vec![2]),
            ("skirt".to_string(), vec![2, 3]),
            ("coord".to_string(), vec![1, 2]),
            ("kurta".to_string(), vec![3]),
            ("lehenga".to_string(), vec![1, 3]),
        ]
    );
}

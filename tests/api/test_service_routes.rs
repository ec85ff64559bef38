// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET / and GET /health

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use cloth_segm_node::api::{create_app, AppState, HealthResponse};
use cloth_segm_node::segmentation::SegmentationService;
use cloth_segm_node::version;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::common::{FakeEncoder, FakeSegmentationModel};

fn state() -> AppState {
    let service = SegmentationService::new(Arc::new(FakeSegmentationModel::uniform(8, 0)));
    AppState::new(Arc::new(service)).with_segmentation_model_name("cloth_segm")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_root_reports_running() {
    let response = create_app(state()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["status"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_health_without_encoder() {
    let response = create_app(state()).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.segmentation_model, "cloth_segm");
    assert_eq!(health.embedding_model, None);
    assert_eq!(health.version, version::VERSION_NUMBER);
}

#[tokio::test]
async fn test_health_with_encoder_uses_camel_case() {
    let app = create_app(state().with_encoder(Arc::new(FakeEncoder)));
    let response = app.oneshot(get("/health")).await.unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["segmentationModel"], "cloth_segm");
    assert_eq!(json["embeddingModel"], "fake-minilm");
}

#[tokio::test]
async fn test_cors_preflight_is_permissive() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/segment/top")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = create_app(state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

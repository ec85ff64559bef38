// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /embed
///
/// # Errors
/// - 422 Unprocessable Entity: body is not `{"text": string}`
/// - 503 Service Unavailable: no encoder configured
/// - 500 Internal Server Error: encoding failed or returned the wrong width
pub async fn embed_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected embed request: {}", e.body_text());
        ApiError::InvalidRequest(e.body_text())
    })?;

    let encoder = state.encoder.clone().ok_or(ApiError::ModelUnavailable)?;

    info!("Generating embedding for: '{}'", request.text);

    let expected = encoder.dimension();
    let text = request.text;
    let (text, vector) = tokio::task::spawn_blocking(move || {
        let vector = encoder.encode(&text);
        (text, vector)
    })
    .await
    .map_err(|e| ApiError::EmbeddingFailed(format!("embedding task failed: {}", e)))?;
    let vector = vector?;

    if vector.len() != expected {
        return Err(ApiError::EmbeddingFailed(format!(
            "encoder returned {} dimensions, expected {}",
            vector.len(),
            expected
        )));
    }

    info!("Embedding generated successfully.");

    Ok(Json(EmbedResponse::new(text, vector)))
}

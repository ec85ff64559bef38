// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Segmentation endpoint handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::upload::{read_upload, NO_FILE_PART};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::segmentation::{category_table, CategoryInfo, GarmentCategory};

/// POST /segment/{category}
///
/// Cuts the garment classes of `category` out of the uploaded `file` and
/// returns them as an RGBA PNG of the original size.
///
/// # Errors
/// - 404 Not Found: unknown category
/// - 400 Bad Request: no `file` part, or an empty filename
/// - 500 Internal Server Error: undecodable image or failed inference
pub async fn segment_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let category: GarmentCategory = category.parse()?;
    let selection = category.selection();

    info!(
        "[{}] Request for {}: using classes {}",
        request_id,
        category.name().to_uppercase(),
        selection
    );

    let multipart = multipart.map_err(|e| {
        debug!("[{}] Not a multipart upload: {}", request_id, e);
        ApiError::MissingInput(NO_FILE_PART.to_string())
    })?;
    let image_bytes = read_upload(multipart).await?;

    let started = Instant::now();
    let png = state
        .segmentation
        .clone()
        .segment_blocking(image_bytes, selection)
        .await
        .map_err(|e| {
            warn!("[{}] Image processing failed: {}", request_id, e);
            ApiError::from(e)
        })?;

    info!(
        "[{}] {} cut-out ready ({} bytes, {} ms)",
        request_id,
        category,
        png.len(),
        started.elapsed().as_millis()
    );

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// GET /segment/categories
pub async fn categories_handler() -> Json<Vec<CategoryInfo>> {
    Json(category_table())
}

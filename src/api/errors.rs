// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::embeddings::EmbeddingError;
use crate::segmentation::{SegmentationError, UnknownCategory};

pub const DECODE_FAILED_MESSAGE: &str =
    "Image processing failed on the server. The image might be invalid or corrupted.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Model is not available";
pub const EMBEDDING_FAILED_MESSAGE: &str = "Failed to generate embedding";

/// Every error body is `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Required multipart field or filename absent
    MissingInput(String),
    /// Multipart body could not be read
    MalformedUpload(String),
    UnknownCategory(String),
    /// JSON body failed to parse or validate
    InvalidRequest(String),
    ModelUnavailable,
    /// Upload could not be decoded as an image
    DecodeFailed(String),
    /// Inference, masking or encoding failed
    ProcessingFailed(String),
    EmbeddingFailed(String),
}

impl ApiError {
    /// Client-facing message; server-side detail stays in the logs
    pub fn message(&self) -> String {
        match self {
            ApiError::MissingInput(msg) => msg.clone(),
            ApiError::MalformedUpload(msg) => format!("Malformed upload: {}", msg),
            ApiError::UnknownCategory(name) => format!("Unknown category: {}", name),
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::ModelUnavailable => MODEL_UNAVAILABLE_MESSAGE.to_string(),
            ApiError::DecodeFailed(_) => DECODE_FAILED_MESSAGE.to_string(),
            ApiError::ProcessingFailed(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            ApiError::EmbeddingFailed(_) => EMBEDDING_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) | ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownCategory(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DecodeFailed(_)
            | ApiError::ProcessingFailed(_)
            | ApiError::EmbeddingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingInput(msg) => write!(f, "Missing input: {}", msg),
            ApiError::MalformedUpload(msg) => write!(f, "Malformed upload: {}", msg),
            ApiError::UnknownCategory(name) => write!(f, "Unknown category: {}", name),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ModelUnavailable => write!(f, "{}", MODEL_UNAVAILABLE_MESSAGE),
            ApiError::DecodeFailed(msg) => write!(f, "Decode failed: {}", msg),
            ApiError::ProcessingFailed(msg) => write!(f, "Processing failed: {}", msg),
            ApiError::EmbeddingFailed(msg) => write!(f, "Embedding failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<UnknownCategory> for ApiError {
    fn from(err: UnknownCategory) -> Self {
        ApiError::UnknownCategory(err.0)
    }
}

impl From<SegmentationError> for ApiError {
    fn from(err: SegmentationError) -> Self {
        if err.is_decode() {
            ApiError::DecodeFailed(err.to_string())
        } else {
            ApiError::ProcessingFailed(err.to_string())
        }
    }
}

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        ApiError::EmbeddingFailed(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::version;

pub const RUNNING_STATUS: &str = "Cloth segmentation service is running.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub segmentation_model: String,
    /// `None` when no encoder is configured and `/embed` answers 503
    pub embedding_model: Option<String>,
    pub version: String,
}

/// GET /
pub async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: RUNNING_STATUS.to_string(),
    })
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        segmentation_model: state.segmentation_model.clone(),
        embedding_model: state
            .encoder
            .as_ref()
            .map(|encoder| encoder.model_name().to_string()),
        version: version::VERSION_NUMBER.to_string(),
    })
}

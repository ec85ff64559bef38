// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::embed::embed_handler;
use super::handlers::{health_handler, root_handler};
use super::segment::{categories_handler, segment_handler};
use crate::config::{ServiceConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::embeddings::{OnnxSentenceEncoder, TextEncoder};
use crate::models::ensure_checkpoint;
use crate::segmentation::{
    OnnxSegmentationModel, SegmentationPostprocessor, SegmentationService,
};

/// Shared, read-only request state
///
/// Built once at startup; the models are dropped with the last clone when
/// the server shuts down.
#[derive(Clone)]
pub struct AppState {
    pub segmentation: Arc<SegmentationService>,
    pub segmentation_model: String,
    /// `/embed` answers 503 while this is `None`
    pub encoder: Option<Arc<dyn TextEncoder>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(segmentation: Arc<SegmentationService>) -> Self {
        Self {
            segmentation,
            segmentation_model: "u2net".to_string(),
            encoder: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn TextEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_segmentation_model_name(mut self, name: impl Into<String>) -> Self {
        self.segmentation_model = name.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Provision and load every configured model.
    ///
    /// Fails if the segmentation checkpoint cannot be found, downloaded or
    /// loaded, or if a configured encoder fails to load.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let checkpoint = config.segmentation_model_path.clone();
        ensure_checkpoint(&checkpoint, config.segmentation_model_url.as_deref())
            .await
            .context("Segmentation checkpoint is unavailable")?;

        let threads = config.inference_threads;
        let max_upload_bytes = config.max_upload_bytes;
        let model = tokio::task::spawn_blocking(move || {
            OnnxSegmentationModel::load(&checkpoint, threads)
        })
        .await
        .context("Segmentation model loader panicked")??;

        let model_name = model.model_name().to_string();
        let service = SegmentationService::new(Arc::new(model))
            .with_postprocessor(SegmentationPostprocessor::new(max_upload_bytes));

        let mut state = Self::new(Arc::new(service))
            .with_segmentation_model_name(model_name)
            .with_max_upload_bytes(max_upload_bytes);

        if let Some(encoder) = load_encoder(config.embedding_model_dir.clone(), threads).await? {
            state = state.with_encoder(encoder);
        }

        Ok(state)
    }
}

/// Load the sentence encoder when a model directory is configured.
///
/// `Ok(None)` means `/embed` is disabled; a configured directory that does
/// not load is an error.
pub async fn load_encoder(
    model_dir: Option<PathBuf>,
    threads: usize,
) -> Result<Option<Arc<dyn TextEncoder>>> {
    let Some(dir) = model_dir else {
        warn!("EMBEDDING_MODEL_DIR not set, /embed will answer 503");
        return Ok(None);
    };

    let encoder = tokio::task::spawn_blocking(move || OnnxSentenceEncoder::load(&dir, threads))
        .await
        .context("Embedding model loader panicked")?
        .context("Failed to load embedding model")?;

    info!(
        "Serving /embed with {} ({} dimensions)",
        encoder.model_name(),
        encoder.dimension()
    );

    let encoder: Arc<dyn TextEncoder> = Arc::new(encoder);
    Ok(Some(encoder))
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/segment/categories", get(categories_handler))
        .route("/segment/:category", post(segment_handler))
        .route("/embed", post(embed_handler))
        .route("/embed/", post(embed_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load models, bind, and serve until Ctrl-C / SIGTERM
pub async fn start_server(config: ServiceConfig) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = create_app(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

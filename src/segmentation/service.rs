// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Segmentation service owning the loaded model
//!
//! Lifecycle: build once at startup with [`SegmentationService::new`] (or
//! [`SegmentationService::from_checkpoint`]), share it behind an `Arc`, and
//! let it drop with the server state on shutdown. Requests never mutate it.

use anyhow::Result;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::class_map::ClassSelection;
use super::error::SegmentationError;
use super::model::{OnnxSegmentationModel, SegmentationModel};
use super::postprocess::SegmentationPostprocessor;
use super::preprocessing::preprocess_for_segmentation;

pub struct SegmentationService {
    model: Arc<dyn SegmentationModel>,
    postprocessor: SegmentationPostprocessor,
}

impl std::fmt::Debug for SegmentationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationService")
            .field("working_size", &self.model.working_size())
            .field("postprocessor", &self.postprocessor)
            .finish()
    }
}

impl SegmentationService {
    pub fn new(model: Arc<dyn SegmentationModel>) -> Self {
        Self {
            model,
            postprocessor: SegmentationPostprocessor::default(),
        }
    }

    pub fn with_postprocessor(mut self, postprocessor: SegmentationPostprocessor) -> Self {
        self.postprocessor = postprocessor;
        self
    }

    /// Load the ONNX checkpoint and wrap it in a service
    pub fn from_checkpoint<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model = OnnxSegmentationModel::load(model_path, intra_threads)?;
        Ok(Self::new(Arc::new(model)))
    }

    pub fn working_size(&self) -> u32 {
        self.model.working_size()
    }

    /// Decode → resize/normalize → forward pass → mask → PNG, on the calling thread
    pub fn segment(
        &self,
        image_bytes: &[u8],
        selection: &ClassSelection,
    ) -> Result<Vec<u8>, SegmentationError> {
        let started = Instant::now();

        let original = self.postprocessor.decode(image_bytes)?;
        let input = preprocess_for_segmentation(&original, self.model.working_size());
        let class_map = self.model.predict(input)?;
        let png = self.postprocessor.compose(&original, &class_map, selection)?;

        debug!(
            "Segmented {}x{} image with classes {} in {} ms",
            original.width(),
            original.height(),
            selection,
            started.elapsed().as_millis()
        );

        Ok(png)
    }

    /// Run [`segment`](Self::segment) on the blocking pool
    pub async fn segment_blocking(
        self: Arc<Self>,
        image_bytes: Bytes,
        selection: ClassSelection,
    ) -> Result<Vec<u8>, SegmentationError> {
        tokio::task::spawn_blocking(move || self.segment(&image_bytes, &selection))
            .await
            .map_err(|e| SegmentationError::processing(format!("segmentation task failed: {}", e)))?
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! U2NET cloth segmentation model wrapper
//!
//! The network takes a normalized [1, 3, 768, 768] tensor and emits per-class
//! scores [1, 4, 768, 768] as its first output. Each pixel is assigned the
//! class with the highest score; log-softmax preserves ordering so the
//! argmax over raw scores equals the argmax over log-probabilities.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView4, Axis, Ix4};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::class_map::{ClassIndex, ClassIndexMap};
use super::error::SegmentationError;
use super::preprocessing::WORKING_SIZE;

/// Produces a class index map from a preprocessed image tensor
pub trait SegmentationModel: Send + Sync {
    /// Square input resolution expected by `predict`
    fn working_size(&self) -> u32;

    fn predict(&self, input: Array4<f32>) -> Result<ClassIndexMap, SegmentationError>;
}

/// ONNX export of the U2NET `cloth_segm` checkpoint (in_ch=3, out_ch=4)
pub struct OnnxSegmentationModel {
    /// ONNX Runtime needs `&mut Session` to run
    session: Mutex<Session>,
    model_name: String,
    working_size: u32,
}

impl std::fmt::Debug for OnnxSegmentationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSegmentationModel")
            .field("model_name", &self.model_name)
            .field("working_size", &self.working_size)
            .finish_non_exhaustive()
    }
}

impl OnnxSegmentationModel {
    /// Load the segmentation graph from disk on the CPU execution provider
    pub fn load<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!(
                "Segmentation checkpoint not found: {}",
                model_path.display()
            );
        }

        info!(
            "Loading segmentation model from {} ({} intra-op threads)",
            model_path.display(),
            intra_threads
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load segmentation model from {}",
                    model_path.display()
                )
            })?;

        let model_name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "u2net".to_string());

        info!("✅ Segmentation model {} loaded", model_name);

        Ok(Self {
            session: Mutex::new(session),
            model_name,
            working_size: WORKING_SIZE,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl SegmentationModel for OnnxSegmentationModel {
    fn working_size(&self) -> u32 {
        self.working_size
    }

    fn predict(&self, input: Array4<f32>) -> Result<ClassIndexMap, SegmentationError> {
        let tensor =
            Value::from_array(input).map_err(|e| SegmentationError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| SegmentationError::processing("segmentation session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| SegmentationError::Inference(e.to_string()))?;

        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| SegmentationError::Inference(e.to_string()))?;
        let scores = scores.into_dimensionality::<Ix4>().map_err(|e| {
            SegmentationError::Inference(format!("expected [N, C, H, W] scores: {}", e))
        })?;

        argmax_classes(scores)
    }
}

/// Per-pixel argmax over the class axis of the first batch item.
///
/// Ties resolve to the lowest class index.
pub fn argmax_classes(scores: ArrayView4<f32>) -> Result<ClassIndexMap, SegmentationError> {
    let (batch, classes, height, width) = scores.dim();
    if batch == 0 || classes == 0 {
        return Err(SegmentationError::Inference(format!(
            "model returned empty scores {:?}",
            scores.shape()
        )));
    }

    let first = scores.index_axis(Axis(0), 0);
    let mut data = vec![0 as ClassIndex; height * width];

    for (i, slot) in data.iter_mut().enumerate() {
        let (y, x) = (i / width, i % width);
        let mut best = first[[0, y, x]];
        let mut best_class = 0;
        for c in 1..classes {
            let score = first[[c, y, x]];
            if score > best {
                best = score;
                best_class = c;
            }
        }
        *slot = best_class as ClassIndex;
    }

    ClassIndexMap::new(width as u32, height as u32, data)
}

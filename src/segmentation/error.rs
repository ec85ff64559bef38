// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use super::image_utils::ImageError;

/// Failures of the decode → infer → mask → encode pipeline
#[derive(Debug, Error)]
pub enum SegmentationError {
    /// The upload could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] ImageError),

    #[error("Invalid class index map: {0}")]
    InvalidClassMap(String),

    #[error("Model inference failed: {0}")]
    Inference(String),

    /// Mask construction, resampling, compositing or encoding failed
    #[error("Image processing failed: {0}")]
    Processing(String),
}

impl SegmentationError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

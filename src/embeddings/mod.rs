// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sentence embeddings
//!
//! The `/embed` endpoint depends only on the [`TextEncoder`] trait, so the
//! ONNX encoder can be swapped for a fake in tests.

pub mod onnx_model;

pub use onnx_model::{OnnxSentenceEncoder, EMBEDDING_DIMENSION, MAX_SEQUENCE_LENGTH};

use ndarray::ArrayView2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected embedding shape: {0}")]
    Shape(String),

    #[error("embedding session lock poisoned")]
    LockPoisoned,
}

/// Maps text to a fixed-size vector
pub trait TextEncoder: Send + Sync {
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Average token embeddings `[seq_len, hidden]`, counting only tokens whose
/// attention mask is set
pub fn mean_pool(tokens: ArrayView2<f32>, attention_mask: &[i64]) -> Result<Vec<f32>, EmbeddingError> {
    let (seq_len, hidden) = tokens.dim();
    if attention_mask.len() != seq_len {
        return Err(EmbeddingError::Shape(format!(
            "attention mask has {} entries for {} tokens",
            attention_mask.len(),
            seq_len
        )));
    }

    let mut pooled = vec![0.0f32; hidden];
    let mut sum_mask = 0.0f32;

    for (row, &mask) in tokens.outer_iter().zip(attention_mask) {
        let weight = mask as f32;
        if weight == 0.0 {
            continue;
        }
        sum_mask += weight;
        for (acc, &value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * weight;
        }
    }

    let denom = sum_mask.max(1e-9);
    for value in &mut pooled {
        *value /= denom;
    }

    Ok(pooled)
}

/// Scale `vector` to unit length in place; a zero vector is left as is
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

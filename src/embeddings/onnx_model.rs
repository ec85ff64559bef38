// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX sentence encoder (all-MiniLM-L6-v2)
//!
//! Expects a model directory holding:
//! - `model.onnx`: BERT encoder emitting token embeddings `[batch, seq_len, 384]`
//! - `tokenizer.json`: the matching HuggingFace tokenizer
//!
//! Sentence vectors are the attention-masked mean of the token embeddings,
//! L2-normalized, as in the sentence-transformers pipeline.

use anyhow::{Context, Result};
use ndarray::{Array2, Axis, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use super::{l2_normalize, mean_pool, EmbeddingError, TextEncoder};

/// Output width of all-MiniLM-L6-v2
pub const EMBEDDING_DIMENSION: usize = 384;

/// Longer inputs are truncated to this many tokens
pub const MAX_SEQUENCE_LENGTH: usize = 256;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct OnnxSentenceEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxSentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSentenceEncoder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxSentenceEncoder {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    ///
    /// Runs one probe inference and fails if the model does not produce
    /// [`EMBEDDING_DIMENSION`]-wide vectors.
    pub fn load<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading embedding model from {}", model_dir.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        let model_name = model_dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "all-MiniLM-L6-v2".to_string());

        let encoder = Self {
            session: Mutex::new(session),
            tokenizer,
            model_name,
            dimension: EMBEDDING_DIMENSION,
        };

        let probe = encoder
            .encode("validation test")
            .context("Embedding model validation failed")?;
        if probe.len() != EMBEDDING_DIMENSION {
            anyhow::bail!(
                "Model outputs {} dimensions (expected {})",
                probe.len(),
                EMBEDDING_DIMENSION
            );
        }

        info!(
            "✅ Embedding model {} loaded ({} dimensions)",
            encoder.model_name, encoder.dimension
        );

        Ok(encoder)
    }

    fn run(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids = vec![0i64; input_ids.len()];

        let ids_tensor = row_tensor(input_ids)?;
        let mask_tensor = row_tensor(attention_mask.clone())?;
        let type_tensor = row_tensor(token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::LockPoisoned)?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor
            ])
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let hidden = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let hidden = hidden
            .into_dimensionality::<Ix3>()
            .map_err(|e| EmbeddingError::Shape(format!("expected [batch, seq_len, hidden]: {}", e)))?;
        if hidden.len_of(Axis(0)) == 0 {
            return Err(EmbeddingError::Shape("empty batch".to_string()));
        }

        mean_pool(hidden.index_axis(Axis(0), 0), &attention_mask)
    }
}

/// `[1, seq_len]` tensor for a single tokenized input
fn row_tensor(values: Vec<i64>) -> Result<Tensor<i64>, EmbeddingError> {
    let array = Array2::from_shape_vec((1, values.len()), values)
        .map_err(|e| EmbeddingError::Shape(e.to_string()))?;
    Tensor::from_array(array).map_err(|e| EmbeddingError::Inference(e.to_string()))
}

impl TextEncoder for OnnxSentenceEncoder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = self.run(text)?;
        if vector.len() != self.dimension {
            return Err(EmbeddingError::Shape(format!(
                "got {} dimensions, expected {}",
                vector.len(),
                self.dimension
            )));
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

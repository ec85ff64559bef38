// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response body for POST /embed

use serde::{Deserialize, Serialize};

/// Echoes the input text alongside its unit-length vector
///
/// ```json
/// {"text": "Cream or Off-white Kurta", "vector": [0.013, -0.094, ...]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub text: String,
    pub vector: Vec<f32>,
}

impl EmbedResponse {
    pub fn new(text: String, vector: Vec<f32>) -> Self {
        Self { text, vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request body for POST /embed

use serde::{Deserialize, Serialize};

/// `{"text": "Cream or Off-white Kurta"}`
///
/// A missing or non-string `text` is rejected by the JSON extractor before
/// the handler runs. Longer inputs are truncated by the tokenizer, not
/// refused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedRequest {
    pub text: String,
}

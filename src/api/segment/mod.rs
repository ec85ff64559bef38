// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /segment/{category}: garment cut-outs as transparent PNGs

pub mod handler;
pub mod upload;

pub use handler::{categories_handler, segment_handler};
pub use upload::{read_upload, NO_FILE_PART, NO_SELECTED_FILE, UPLOAD_FIELD};

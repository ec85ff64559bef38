// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model artifact provisioning

pub mod download;

pub use download::{download_file, ensure_checkpoint, CheckpointSource, DownloadError};

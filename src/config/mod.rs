// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration, read from flags or the environment

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEGMENTATION_MODEL_PATH: &str = "cloth_segm.onnx";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_INFERENCE_THREADS: usize = 4;

/// Garment segmentation and text embedding server
#[derive(Parser, Debug, Clone)]
#[command(name = "cloth-segm-node")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Garment segmentation and text embedding HTTP service", long_about = None)]
pub struct ServiceConfig {
    /// Interface or hostname to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// U2NET checkpoint exported to ONNX
    #[arg(long, env = "SEGMENTATION_MODEL_PATH", default_value = DEFAULT_SEGMENTATION_MODEL_PATH)]
    pub segmentation_model_path: PathBuf,

    /// Where to fetch the checkpoint from when it is missing locally
    #[arg(long, env = "SEGMENTATION_MODEL_URL")]
    pub segmentation_model_url: Option<String>,

    /// Directory holding model.onnx and tokenizer.json; /embed answers 503 without it
    #[arg(long, env = "EMBEDDING_MODEL_DIR")]
    pub embedding_model_dir: Option<PathBuf>,

    /// Largest accepted request body
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// ONNX Runtime intra-op threads per model
    #[arg(long, env = "INFERENCE_THREADS", default_value_t = DEFAULT_INFERENCE_THREADS)]
    pub inference_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            segmentation_model_path: PathBuf::from(DEFAULT_SEGMENTATION_MODEL_PATH),
            segmentation_model_url: None,
            embedding_model_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            inference_threads: DEFAULT_INFERENCE_THREADS,
        }
    }
}

impl ServiceConfig {
    /// `host:port` as accepted by `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

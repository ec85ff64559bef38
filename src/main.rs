// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use cloth_segm_node::{api::start_server, config::ServiceConfig, version};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Starting Cloth Segmentation Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = ServiceConfig::parse();
    tracing::info!(
        "Segmentation checkpoint: {} (download URL {})",
        config.segmentation_model_path.display(),
        if config.segmentation_model_url.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );

    start_server(config).await
}

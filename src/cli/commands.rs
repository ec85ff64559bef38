// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::config::{DEFAULT_INFERENCE_THREADS, DEFAULT_SEGMENTATION_MODEL_PATH};
use crate::models::{ensure_checkpoint, CheckpointSource};
use crate::segmentation::{category_table, ClassSelection, GarmentCategory, SegmentationService};

/// Arguments for the segment command
#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// Image to segment
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the RGBA PNG
    #[arg(long)]
    pub output: PathBuf,

    /// Garment category (top, bottom, skirt, coord, kurta, lehenga)
    #[arg(long, conflicts_with = "classes", required_unless_present = "classes")]
    pub category: Option<GarmentCategory>,

    /// Comma-separated class indices to keep, e.g. 1,3
    #[arg(long)]
    pub classes: Option<ClassSelection>,

    /// Segmentation checkpoint
    #[arg(long, env = "SEGMENTATION_MODEL_PATH", default_value = DEFAULT_SEGMENTATION_MODEL_PATH)]
    pub model: PathBuf,

    /// Download source used when the checkpoint is missing
    #[arg(long, env = "SEGMENTATION_MODEL_URL")]
    pub model_url: Option<String>,

    #[arg(long, env = "INFERENCE_THREADS", default_value_t = DEFAULT_INFERENCE_THREADS)]
    pub threads: usize,
}

impl SegmentArgs {
    pub fn selection(&self) -> ClassSelection {
        match (&self.category, &self.classes) {
            (Some(category), _) => category.selection(),
            (None, Some(classes)) => classes.clone(),
            (None, None) => ClassSelection::empty(),
        }
    }
}

/// Arguments for the fetch-model command
#[derive(Args, Debug)]
pub struct FetchModelArgs {
    /// Checkpoint URL
    #[arg(long, env = "SEGMENTATION_MODEL_URL")]
    pub url: Option<String>,

    /// Destination path
    #[arg(long, env = "SEGMENTATION_MODEL_PATH", default_value = DEFAULT_SEGMENTATION_MODEL_PATH)]
    pub path: PathBuf,
}

pub async fn segment(args: SegmentArgs) -> Result<()> {
    let selection = args.selection();
    println!("--- Starting Local Model Test ---");

    ensure_checkpoint(&args.model, args.model_url.as_deref()).await?;

    let image_bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    println!("Opening image: {}", args.input.display());

    let model_path = args.model.clone();
    let threads = args.threads;
    let started = Instant::now();
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let service = SegmentationService::from_checkpoint(&model_path, threads)?;
        info!("Processing image with classes: {}", selection);
        Ok(service.segment(&image_bytes, &selection)?)
    })
    .await
    .context("Segmentation task panicked")??;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&args.output, &png)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "✅ Success! Result saved to: {} ({} bytes, {} ms)",
        args.output.display(),
        png.len(),
        started.elapsed().as_millis()
    );
    Ok(())
}

pub async fn fetch_model(args: FetchModelArgs) -> Result<()> {
    match ensure_checkpoint(&args.path, args.url.as_deref()).await? {
        CheckpointSource::Local => {
            println!("Model file '{}' already exists.", args.path.display());
        }
        CheckpointSource::Downloaded { bytes } => {
            println!(
                "✅ Downloaded '{}' ({} bytes)",
                args.path.display(),
                bytes
            );
        }
    }
    Ok(())
}

pub fn print_categories() -> Result<()> {
    for info in category_table() {
        println!("{:<10} {:?}", info.name, info.classes);
    }
    Ok(())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Local tooling for the cloth segmentation node
#[derive(Parser, Debug)]
#[command(name = "segment-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Run garment segmentation locally and manage the checkpoint", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut garments out of a local image and write a transparent PNG
    Segment(commands::SegmentArgs),

    /// Download the segmentation checkpoint if it is not present
    FetchModel(commands::FetchModelArgs),

    /// List garment categories and their class indices
    Categories,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Segment(args) => commands::segment(args).await,
        Commands::FetchModel(args) => commands::fetch_model(args).await,
        Commands::Categories => commands::print_categories(),
    }
}

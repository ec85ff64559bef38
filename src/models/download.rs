// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Checkpoint download with a terminal progress bar
//!
//! Bytes are streamed into `<dest>.part` and renamed into place only after
//! the whole body arrived, so an interrupted or failed download never
//! leaves a truncated checkpoint behind.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Checkpoint not found at {} and no download URL is configured", path.display())]
    MissingCheckpoint { path: PathBuf },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        DownloadError::NetworkError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointSource {
    /// File was already on disk
    Local,
    Downloaded { bytes: u64 },
}

/// Make sure the checkpoint exists at `path`, downloading it from `url` if not
pub async fn ensure_checkpoint(
    path: &Path,
    url: Option<&str>,
) -> Result<CheckpointSource, DownloadError> {
    if fs::try_exists(path).await? {
        info!("Checkpoint found at {}", path.display());
        return Ok(CheckpointSource::Local);
    }

    let url = url.ok_or_else(|| DownloadError::MissingCheckpoint {
        path: path.to_path_buf(),
    })?;

    info!("Checkpoint missing at {}, downloading from {}", path.display(), url);
    let bytes = download_file(url, path).await?;
    Ok(CheckpointSource::Downloaded { bytes })
}

/// Stream `url` to `dest`, returning the number of bytes written
pub async fn download_file(url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let partial = partial_path(dest);
    match stream_to(url, &partial).await {
        Ok(bytes) => {
            fs::rename(&partial, dest).await?;
            Ok(bytes)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", partial.display(), cleanup);
                }
            }
            Err(e)
        }
    }
}

async fn stream_to(url: &str, partial: &Path) -> Result<u64, DownloadError> {
    let started = Instant::now();
    let response = reqwest::get(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(parent) = partial.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let progress = progress_bar(response.content_length());
    let mut file = fs::File::create(partial).await?;
    let mut written = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        progress.set_position(written);
    }
    file.flush().await?;
    file.sync_all().await?;
    progress.finish_and_clear();

    info!(
        "Downloaded {} bytes in {:.1}s",
        written,
        started.elapsed().as_secs_f32()
    );

    Ok(written)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::with_template(
                "{msg} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_message("cloth_segm");
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("cloth_segm (size unknown)");
            spinner
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload decoding for the segmentation pipeline

use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Default cap on an encoded upload (10MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Reasons an upload could not be turned into pixels
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Metadata recorded while decoding an upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub size_bytes: usize,
}

/// Decode an encoded upload into an RGB pixel grid.
///
/// The format is sniffed from the leading bytes; bytes the `image` crate
/// cannot identify are rejected before a decoder is run. Alpha and palette
/// inputs are flattened to three channels.
pub fn decode_rgb(bytes: &[u8], max_bytes: usize) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(bytes.len(), max_bytes));
    }

    let format = sniff_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: decoded.width(),
        height: decoded.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((into_rgb(decoded), info))
}

/// Identify the container format of an upload from its magic bytes.
///
/// Any format the `image` crate recognises is accepted here; whether it can
/// actually be decoded is left to the decoder.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)
}

fn into_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

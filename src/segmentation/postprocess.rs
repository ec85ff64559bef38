// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turns a class index map into a transparent PNG cut-out of the original image

use image::{DynamicImage, ImageFormat, Rgba, RgbImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

use super::class_map::{ClassIndexMap, ClassSelection};
use super::error::SegmentationError;
use super::image_utils::{decode_rgb, DEFAULT_MAX_IMAGE_BYTES};
use super::mask::AlphaMask;

/// Masks the original image by the selected classes and re-encodes it as RGBA PNG.
///
/// The alpha channel is the class mask scaled from the model's working
/// resolution to the original image size, so it is soft (not strictly 0/255)
/// along class boundaries. RGB values are passed through untouched, including
/// under fully transparent pixels.
#[derive(Debug, Clone)]
pub struct SegmentationPostprocessor {
    max_image_bytes: usize,
}

impl Default for SegmentationPostprocessor {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl SegmentationPostprocessor {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Decode an upload into RGB, reporting failures as `SegmentationError::Decode`
    pub fn decode(&self, image_bytes: &[u8]) -> Result<RgbImage, SegmentationError> {
        let (rgb, info) = decode_rgb(image_bytes, self.max_image_bytes)?;
        debug!(
            "Decoded {:?} upload: {}x{} ({} bytes)",
            info.format, info.width, info.height, info.size_bytes
        );
        Ok(rgb)
    }

    /// Full contract: encoded image + class map + selection → PNG bytes
    pub fn process(
        &self,
        image_bytes: &[u8],
        class_map: &ClassIndexMap,
        selection: &ClassSelection,
    ) -> Result<Vec<u8>, SegmentationError> {
        let original = self.decode(image_bytes)?;
        self.compose(&original, class_map, selection)
    }

    /// Mask, resample, composite and encode an already decoded image
    pub fn compose(
        &self,
        original: &RgbImage,
        class_map: &ClassIndexMap,
        selection: &ClassSelection,
    ) -> Result<Vec<u8>, SegmentationError> {
        let (width, height) = original.dimensions();

        let mask = AlphaMask::from_class_map(class_map, selection)?.resample(width, height)?;
        let rgba = apply_alpha(original, &mask)?;

        encode_png(rgba)
    }
}

/// Attach `mask` to `rgb` as its alpha channel
pub fn apply_alpha(rgb: &RgbImage, mask: &AlphaMask) -> Result<RgbaImage, SegmentationError> {
    if rgb.dimensions() != mask.dimensions() {
        return Err(SegmentationError::processing(format!(
            "mask is {:?} but image is {:?}",
            mask.dimensions(),
            rgb.dimensions()
        )));
    }

    let mut out = RgbaImage::new(rgb.width(), rgb.height());
    for ((dst, src), &alpha) in out.pixels_mut().zip(rgb.pixels()).zip(mask.as_raw()) {
        *dst = Rgba([src[0], src[1], src[2], alpha]);
    }

    Ok(out)
}

pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, SegmentationError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| SegmentationError::processing(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

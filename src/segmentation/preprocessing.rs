// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the U2NET cloth segmentation network

use image::{imageops, RgbImage};
use ndarray::Array4;

use super::mask::RESAMPLE_FILTER;

/// Square input resolution the network was trained at
pub const WORKING_SIZE: u32 = 768;

/// Per-channel normalization: (pixel / 255 - MEAN) / STD
pub const MEAN: f32 = 0.5;
pub const STD: f32 = 0.5;

/// Preprocess an RGB image for the segmentation network
///
/// Steps:
/// 1. Stretch to `size` x `size` with bicubic filtering (aspect ratio is not kept)
/// 2. Scale to [0, 1] and normalize with mean/std 0.5, giving [-1, 1]
/// 3. Lay out as an NCHW tensor [1, 3, size, size]
pub fn preprocess_for_segmentation(image: &RgbImage, size: u32) -> Array4<f32> {
    let resized;
    let source = if image.dimensions() == (size, size) {
        image
    } else {
        resized = imageops::resize(image, size, size, RESAMPLE_FILTER);
        &resized
    };

    let side = size as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));

    for (x, y, pixel) in source.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = normalize(pixel[c]);
        }
    }

    tensor
}

fn normalize(value: u8) -> f32 {
    (value as f32 / 255.0 - MEAN) / STD
}

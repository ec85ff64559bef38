// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Alpha mask construction and resampling

use image::imageops::{self, FilterType};
use image::GrayImage;

use super::class_map::{ClassIndexMap, ClassSelection};
use super::error::SegmentationError;

pub const OPAQUE: u8 = 255;
pub const TRANSPARENT: u8 = 0;

/// Bicubic kernel used when scaling masks and model inputs.
///
/// Catmull-Rom is the a = -0.5 cubic, the same kernel PIL applies for
/// `Image.BICUBIC`.
pub const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Per-pixel opacity grid.
///
/// A mask built from a class map is strictly binary. After [`resample`]
/// pixels near a class boundary take intermediate values; uniform regions
/// stay exactly 0 or 255.
///
/// [`resample`]: AlphaMask::resample
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    image: GrayImage,
}

impl AlphaMask {
    /// 255 where the pixel's class is in `selection`, 0 everywhere else
    pub fn from_class_map(
        map: &ClassIndexMap,
        selection: &ClassSelection,
    ) -> Result<Self, SegmentationError> {
        let data: Vec<u8> = map
            .as_slice()
            .iter()
            .map(|&class| {
                if selection.contains(class) {
                    OPAQUE
                } else {
                    TRANSPARENT
                }
            })
            .collect();

        let image = GrayImage::from_raw(map.width(), map.height(), data).ok_or_else(|| {
            SegmentationError::processing("mask buffer does not match class map dimensions")
        })?;

        Ok(Self { image })
    }

    /// Scale to `width`x`height` with bicubic interpolation
    pub fn resample(&self, width: u32, height: u32) -> Result<Self, SegmentationError> {
        if width == 0 || height == 0 {
            return Err(SegmentationError::processing(format!(
                "cannot resample mask to {}x{}",
                width, height
            )));
        }
        if self.image.dimensions() == (width, height) {
            return Ok(self.clone());
        }

        Ok(Self {
            image: imageops::resize(&self.image, width, height, RESAMPLE_FILTER),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn is_uniform(&self, value: u8) -> bool {
        self.image.as_raw().iter().all(|&v| v == value)
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Garment segmentation
//!
//! Pipeline: decode upload → stretch to the model's working size →
//! U2NET forward pass → per-pixel argmax → class selection mask →
//! bicubic resample to original size → RGBA PNG.

pub mod categories;
pub mod class_map;
pub mod error;
pub mod image_utils;
pub mod mask;
pub mod model;
pub mod postprocess;
pub mod preprocessing;
pub mod service;

pub use categories::{category_table, CategoryInfo, GarmentCategory, UnknownCategory};
pub use class_map::{
    ClassIndex, ClassIndexMap, ClassSelection, BACKGROUND, FULL_BODY, LOWER_BODY, UPPER_BODY,
};
pub use error::SegmentationError;
pub use image_utils::{decode_rgb, ImageError, ImageInfo, DEFAULT_MAX_IMAGE_BYTES};
pub use mask::AlphaMask;
pub use model::{argmax_classes, OnnxSegmentationModel, SegmentationModel};
pub use postprocess::{apply_alpha, encode_png, SegmentationPostprocessor};
pub use preprocessing::{preprocess_for_segmentation, WORKING_SIZE};
pub use service::SegmentationService;

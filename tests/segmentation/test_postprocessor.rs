// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image → mask → alpha-composite properties

use cloth_segm_node::segmentation::{
    ClassIndexMap, ClassSelection, SegmentationError, SegmentationPostprocessor, WORKING_SIZE,
};
use image::RgbaImage;

use crate::common::{jpeg, png};

fn run(image: &[u8], map: &ClassIndexMap, classes: &[u32]) -> RgbaImage {
    let bytes = SegmentationPostprocessor::default()
        .process(image, map, &ClassSelection::new(classes.iter().copied()))
        .unwrap();
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

fn alphas(image: &RgbaImage) -> impl Iterator<Item = u8> + '_ {
    image.pixels().map(|p| p[3])
}

#[test]
fn test_empty_selection_is_fully_transparent() {
    let map = ClassIndexMap::from_fn(64, 64, |x, y| (x / 16 + y / 16) % 4).unwrap();
    let out = run(&png(50, 70), &map, &[]);
    assert!(alphas(&out).all(|a| a == 0));
}

#[test]
fn test_selecting_every_present_class_is_fully_opaque() {
    let map = ClassIndexMap::from_fn(64, 64, |x, _| if x < 32 { 0 } else { 2 }).unwrap();
    let present: Vec<u32> = map.classes_present().into_iter().collect();
    let out = run(&png(33, 91), &map, &present);
    assert!(alphas(&out).all(|a| a == 255));
}

#[test]
fn test_full_resolution_upper_body_map_is_uniformly_opaque() {
    let map = ClassIndexMap::filled(WORKING_SIZE, WORKING_SIZE, 1).unwrap();
    for (w, h) in [(1, 1), (640, 480), (1000, 1500)] {
        let out = run(&jpeg(w, h), &map, &[1]);
        assert_eq!(out.dimensions(), (w, h));
        assert!(alphas(&out).all(|a| a == 255), "not opaque at {}x{}", w, h);
    }
}

#[test]
fn test_absent_classes_are_fully_transparent() {
    let map = ClassIndexMap::from_fn(96, 96, |x, y| (x + y) % 2).unwrap();
    let out = run(&png(120, 80), &map, &[2, 3]);
    assert!(alphas(&out).all(|a| a == 0));
}

#[test]
fn test_mask_keeps_spatial_correspondence() {
    // Left half upper-body, right half background
    let size = WORKING_SIZE;
    let map = ClassIndexMap::from_fn(size, size, |x, _| if x < size / 2 { 1 } else { 0 }).unwrap();
    let out = run(&png(400, 200), &map, &[1]);

    assert_eq!(out.get_pixel(20, 100)[3], 255);
    assert_eq!(out.get_pixel(150, 10)[3], 255);
    assert_eq!(out.get_pixel(250, 190)[3], 0);
    assert_eq!(out.get_pixel(380, 100)[3], 0);
}

#[test]
fn test_boundary_is_soft_after_upscaling() {
    let map = ClassIndexMap::from_fn(16, 16, |x, _| if x < 8 { 1 } else { 0 }).unwrap();
    let out = run(&png(256, 16), &map, &[1]);

    assert!(alphas(&out).any(|a| a != 0 && a != 255));
}

#[test]
fn test_rgb_is_untouched() {
    let source = png(30, 20);
    let original = image::load_from_memory(&source).unwrap().to_rgb8();
    let map = ClassIndexMap::filled(8, 8, 3).unwrap();

    let out = run(&source, &map, &[1]);
    for (x, y, pixel) in out.enumerate_pixels() {
        let rgb = original.get_pixel(x, y);
        assert_eq!(&pixel.0[..3], &rgb.0[..]);
    }
}

#[test]
fn test_output_matches_input_size_for_jpeg() {
    let map = ClassIndexMap::filled(32, 32, 2).unwrap();
    let out = run(&jpeg(317, 211), &map, &[2]);
    assert_eq!(out.dimensions(), (317, 211));
}

#[test]
fn test_undecodable_input_is_decode_error() {
    let map = ClassIndexMap::filled(8, 8, 1).unwrap();
    let postprocessor = SegmentationPostprocessor::default();
    let selection = ClassSelection::new([1]);

    for bytes in [&b""[..], &b"hello world"[..], &b"\x89PNG\r\n\x1a\n truncated"[..]] {
        let err = postprocessor.process(bytes, &map, &selection).unwrap_err();
        assert!(
            matches!(err, SegmentationError::Decode(_)),
            "expected decode error, got {:?}",
            err
        );
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end extraction on synthetic sketches

use image::{DynamicImage, GrayImage, Luma, RgbImage, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use sketchpart_vision::{CanonicalFeatureSet, FeatureExtractor, FeatureNormalizer};

const INK: Luma<u8> = Luma([0]);

/// Line drawing of a 260x160 px plate with two holes and a vertical bend
fn plate_sketch() -> GrayImage {
    let mut img = GrayImage::from_pixel(320, 220, Luma([255]));
    for inset in 0..3 {
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(20 + inset, 20 + inset).of_size(260 - 2 * inset as u32, 160 - 2 * inset as u32),
            INK,
        );
    }
    for r in 14..=16 {
        draw_hollow_circle_mut(&mut img, (80, 100), r, INK);
        draw_hollow_circle_mut(&mut img, (220, 100), r, INK);
    }
    draw_filled_rect_mut(&mut img, Rect::at(149, 40).of_size(3, 120), INK);
    img
}

#[test]
fn extracts_outline_holes_and_bend_from_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.png");
    plate_sketch().save(&path).unwrap();

    let raw = FeatureExtractor::default().extract_path(&path).unwrap();

    let width = raw.outline.pixel_width().unwrap();
    assert!((width - 259.0).abs() <= 2.0, "outline width {width}");

    assert_eq!(raw.holes.len(), 2, "holes: {:?}", raw.holes);
    let mut xs: Vec<f64> = raw.holes.iter().map(|h| h.center.x).collect();
    xs.sort_by(f64::total_cmp);
    assert!((xs[0] - 80.0).abs() < 2.0);
    assert!((xs[1] - 220.0).abs() < 2.0);
    for h in &raw.holes {
        assert!(h.radius > 11.0 && h.radius < 19.0, "radius {}", h.radius);
    }

    let bend = raw.bend_lines.iter().find(|b| {
        (b.line[0].x - 150.0).abs() < 4.0 && (b.line[1].x - 150.0).abs() < 4.0
    });
    assert!(bend.is_some(), "bend lines: {:?}", raw.bend_lines);
    assert!(raw.bend_lines.iter().all(|b| b.length() >= 50.0));
}

#[test]
fn color_input_is_accepted() {
    let gray = plate_sketch();
    let rgb = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    let raw = FeatureExtractor::default().extract(&DynamicImage::ImageRgb8(rgb));
    assert_eq!(raw.holes.len(), 2);
}

#[test]
fn extractor_output_normalizes_losslessly() {
    let raw = FeatureExtractor::default().extract(&DynamicImage::ImageLuma8(plate_sketch()));
    let canonical = FeatureNormalizer.normalize_raw(&raw);
    assert_eq!(canonical.outline(), &raw.outline);
    assert_eq!(canonical.holes(), raw.holes.as_slice());
    assert_eq!(canonical.bend_lines(), raw.bend_lines.as_slice());

    let json = serde_json::to_string(&canonical).unwrap();
    let reloaded: CanonicalFeatureSet = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, canonical);
}

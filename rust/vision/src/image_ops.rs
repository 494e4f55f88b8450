// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations for sketch preprocessing

use crate::types::DetectionConfig;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;

/// Images produced by the preprocessing stage
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Grayscale source
    pub gray: GrayImage,
    /// Inverse Otsu binary after closing (ink = 255)
    pub binary: GrayImage,
    /// Canny edges of the cleaned binary
    pub edges: GrayImage,
}

/// Grayscale -> blur -> inverse Otsu -> close -> Canny
pub fn preprocess(image: &DynamicImage, config: &DetectionConfig) -> Preprocessed {
    let gray = image.to_luma8();
    let blurred = gaussian_blur(&gray, config.blur_sigma);
    let level = otsu_level(&blurred);
    let binary = threshold_inverse(&blurred, level);
    let binary = morphological_close(&binary, config.close_radius);
    let edges = canny_edges(&binary, config.canny_low, config.canny_high);

    Preprocessed {
        gray,
        binary,
        edges,
    }
}

/// Apply Gaussian blur for noise reduction
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Apply Canny edge detection
pub fn canny_edges(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    imageproc::edges::canny(image, low_threshold, high_threshold)
}

/// Morphological closing with a square structuring element
pub fn morphological_close(image: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }
    let dilated = imageproc::morphology::dilate(image, Norm::LInf, radius);
    imageproc::morphology::erode(&dilated, Norm::LInf, radius)
}

/// Inverse binary threshold: pixels above the level become black, the rest white
pub fn threshold_inverse(image: &GrayImage, threshold_value: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] > threshold_value { 0 } else { 255 };
        result.put_pixel(x, y, Luma([value]));
    }

    result
}

/// Calculate Otsu's optimal threshold level
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u32; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = (image.width() as f64) * (image.height() as f64);
    if total_pixels == 0.0 {
        return 128;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut max_variance = 0.0;
    let mut best_threshold = 0u8;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }

        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += t as f64 * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;

        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);

        if variance > max_variance {
            max_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: u32, height: u32, split: u32, dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < split {
                Luma([dark])
            } else {
                Luma([light])
            }
        })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let img = two_tone(20, 10, 5, 30, 220);
        let level = otsu_level(&img);
        assert!((30..220).contains(&level));
    }

    #[test]
    fn test_threshold_inverse_marks_ink_white() {
        let img = two_tone(10, 10, 5, 100, 200);
        let result = threshold_inverse(&img, 150);
        assert_eq!(result.get_pixel(0, 0).0[0], 255);
        assert_eq!(result.get_pixel(9, 0).0[0], 0);
    }

    #[test]
    fn test_close_fills_single_pixel_gap() {
        let mut img = GrayImage::new(9, 3);
        for x in 0..9 {
            if x != 4 {
                img.put_pixel(x, 1, Luma([255]));
            }
        }
        let closed = morphological_close(&img, 1);
        assert_eq!(closed.get_pixel(4, 1).0[0], 255);
    }

    #[test]
    fn test_preprocess_dark_square_on_white() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([255]));
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let pre = preprocess(&DynamicImage::ImageLuma8(img), &DetectionConfig::default());
        assert_eq!(pre.binary.get_pixel(20, 20).0[0], 255);
        assert_eq!(pre.binary.get_pixel(2, 2).0[0], 0);
        assert!(pre.edges.pixels().any(|p| p.0[0] > 0));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gradient Hough transform for circles
//!
//! Each edge pixel votes along its gradient direction (both senses) for every
//! radius in range. Centers are accumulator peaks above the vote threshold,
//! kept greedily by votes while respecting the minimum center distance. The
//! radius of each center is the best-supported distance to the edge pixels.

use crate::image_ops::canny_edges;
use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use nalgebra::Point2;

/// Parameters for [`hough_circles`]
#[derive(Debug, Clone, Copy)]
pub struct CircleParams {
    /// Inverse accumulator resolution (1.0 = image resolution)
    pub dp: f64,
    pub min_dist: f64,
    /// Upper Canny threshold; the lower one is half of it
    pub param1: f32,
    /// Accumulator votes needed for a center
    pub param2: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

/// A detected circle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
    pub votes: u32,
}

/// Detect circles in a grayscale image, strongest first
pub fn hough_circles(gray: &GrayImage, params: &CircleParams) -> Vec<Circle> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 || params.max_radius < params.min_radius || params.dp <= 0.0 {
        return Vec::new();
    }

    let edges = canny_edges(gray, params.param1 / 2.0, params.param1);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let acc_w = ((width as f64) / params.dp).ceil() as usize + 1;
    let acc_h = ((height as f64) / params.dp).ceil() as usize + 1;
    let mut accumulator = vec![0u32; acc_w * acc_h];

    let mut edge_points = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p.0[0] == 0 {
            continue;
        }
        edge_points.push((x as f64, y as f64));

        let dx = gx.get_pixel(x, y).0[0] as f64;
        let dy = gy.get_pixel(x, y).0[0] as f64;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag < 1e-6 {
            continue;
        }
        let (ux, uy) = (dx / mag, dy / mag);

        for sign in [1.0, -1.0] {
            // Consecutive radii can land in the same cell; vote once per cell
            let mut last_cell = usize::MAX;
            for r in params.min_radius..=params.max_radius {
                let cx = (x as f64 + sign * ux * r as f64) / params.dp;
                let cy = (y as f64 + sign * uy * r as f64) / params.dp;
                if cx < 0.0 || cy < 0.0 {
                    break;
                }
                let (ix, iy) = (cx.round() as usize, cy.round() as usize);
                if ix >= acc_w || iy >= acc_h {
                    break;
                }
                let cell = iy * acc_w + ix;
                if cell != last_cell {
                    accumulator[cell] += 1;
                    last_cell = cell;
                }
            }
        }
    }

    let centers = pick_centers(&accumulator, acc_w, acc_h, params);

    centers
        .into_iter()
        .filter_map(|(center, votes)| {
            best_radius(&center, &edge_points, params).map(|radius| Circle {
                center,
                radius,
                votes,
            })
        })
        .collect()
}

/// Local accumulator maxima above the threshold, greedily separated by `min_dist`
fn pick_centers(
    accumulator: &[u32],
    acc_w: usize,
    acc_h: usize,
    params: &CircleParams,
) -> Vec<(Point2<f64>, u32)> {
    let mut candidates = Vec::new();
    for y in 1..acc_h.saturating_sub(1) {
        for x in 1..acc_w.saturating_sub(1) {
            let v = accumulator[y * acc_w + x];
            if v <= params.param2 {
                continue;
            }
            let left = accumulator[y * acc_w + x - 1];
            let right = accumulator[y * acc_w + x + 1];
            let up = accumulator[(y - 1) * acc_w + x];
            let down = accumulator[(y + 1) * acc_w + x];
            if v > left && v >= right && v > up && v >= down {
                candidates.push((x, y, v));
            }
        }
    }
    candidates.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)).then(a.0.cmp(&b.0)));

    let mut accepted: Vec<(Point2<f64>, u32)> = Vec::new();
    for (x, y, v) in candidates {
        let center = Point2::new(x as f64 * params.dp, y as f64 * params.dp);
        if accepted
            .iter()
            .all(|(c, _)| (c - center).norm() >= params.min_dist)
        {
            accepted.push((center, v));
        }
    }
    accepted
}

/// Radius with the most edge support; at least a quarter of the circumference must agree
fn best_radius(center: &Point2<f64>, edge_points: &[(f64, f64)], params: &CircleParams) -> Option<f64> {
    let min_r = params.min_radius as usize;
    let max_r = params.max_radius as usize;
    let mut histogram = vec![0u32; max_r + 2];

    for &(x, y) in edge_points {
        let d = ((x - center.x).powi(2) + (y - center.y).powi(2)).sqrt();
        let bin = d.round() as usize;
        if bin >= min_r && bin <= max_r {
            histogram[bin] += 1;
        }
    }

    let (best, support) = (min_r..=max_r)
        .map(|r| {
            // Pixelated rims spread over neighbouring bins
            let s = histogram[r] + histogram[r.saturating_sub(1)].min(histogram[r]) / 2
                + histogram[r + 1].min(histogram[r]) / 2;
            (r, s)
        })
        .max_by(|a, b| {
            let sa = a.1 as f64 / a.0.max(1) as f64;
            let sb = b.1 as f64 / b.0.max(1) as f64;
            sa.total_cmp(&sb).then(b.0.cmp(&a.0))
        })?;

    let circumference = 2.0 * std::f64::consts::PI * best as f64;
    if (support as f64) < circumference * 0.25 {
        return None;
    }
    Some(best as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_hollow_circle_mut;

    fn params() -> CircleParams {
        CircleParams {
            dp: 1.2,
            min_dist: 15.0,
            param1: 100.0,
            param2: 25,
            min_radius: 4,
            max_radius: 40,
        }
    }

    #[test]
    fn test_finds_drawn_ring() {
        let mut img = GrayImage::from_pixel(160, 160, Luma([255]));
        for r in 18..=21 {
            draw_hollow_circle_mut(&mut img, (80, 80), r, Luma([0]));
        }
        let circles = hough_circles(&img, &params());
        assert!(!circles.is_empty());
        let c = &circles[0];
        assert!((c.center.x - 80.0).abs() <= 3.0, "center x {}", c.center.x);
        assert!((c.center.y - 80.0).abs() <= 3.0, "center y {}", c.center.y);
        assert!(c.radius >= 15.0 && c.radius <= 24.0, "radius {}", c.radius);
    }

    #[test]
    fn test_blank_image_has_no_circles() {
        let img = GrayImage::from_pixel(100, 100, Luma([255]));
        assert!(hough_circles(&img, &params()).is_empty());
    }

    #[test]
    fn test_invalid_radius_range() {
        let img = GrayImage::from_pixel(50, 50, Luma([255]));
        let mut p = params();
        p.min_radius = 30;
        p.max_radius = 10;
        assert!(hough_circles(&img, &p).is_empty());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight segment detection and bend-line selection

use crate::types::{BendLine, DetectionConfig, Point2D};
use image::GrayImage;
use nalgebra::Point2;
use sketchpart_geometry::bool2d::signed_distance_to_contour;
use std::f64::consts::PI;

/// A raw segment from the Hough transform, integer pixel endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl Segment {
    pub fn length(&self) -> f64 {
        let dx = (self.end.0 - self.start.0) as f64;
        let dy = (self.end.1 - self.start.1) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self) -> Point2<f64> {
        Point2::new(
            (self.start.0 + self.end.0) as f64 / 2.0,
            (self.start.1 + self.end.1) as f64 / 2.0,
        )
    }
}

/// Detect segments with a Hough transform and gap-split along each peak line
///
/// Rho resolution is one pixel and theta resolution one degree. Edge pixels
/// already claimed by an accepted segment do not seed later ones.
pub fn detect_segments(
    edges: &GrayImage,
    threshold: u32,
    min_line_length: f64,
    max_line_gap: f64,
) -> Vec<Segment> {
    let width = edges.width() as i32;
    let height = edges.height() as i32;

    let num_thetas = 180usize;
    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..num_thetas)
        .map(|i| {
            let theta = i as f64 * PI / num_thetas as f64;
            (theta.cos(), theta.sin())
        })
        .unzip();

    let max_rho = ((width * width + height * height) as f64).sqrt().ceil();
    let num_rhos = (2.0 * max_rho) as usize + 1;

    let edge_points: Vec<(i32, i32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] > 128)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect();

    let mut accumulator = vec![0u32; num_thetas * num_rhos];
    for &(x, y) in &edge_points {
        for t in 0..num_thetas {
            let rho = x as f64 * cos_table[t] + y as f64 * sin_table[t];
            let r = (rho + max_rho).round() as usize;
            if r < num_rhos {
                accumulator[t * num_rhos + r] += 1;
            }
        }
    }

    let mut peaks: Vec<(usize, usize, u32)> = accumulator
        .iter()
        .enumerate()
        .filter(|(_, &votes)| votes >= threshold)
        .map(|(i, &votes)| (i / num_rhos, i % num_rhos, votes))
        .collect();
    peaks.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

    let mut segments = Vec::new();
    let mut used = vec![false; edge_points.len()];

    for &(t, r, _) in peaks.iter().take(500) {
        let rho = r as f64 - max_rho;
        let (cos_t, sin_t) = (cos_table[t], sin_table[t]);

        let mut on_line: Vec<(i32, i32, usize)> = edge_points
            .iter()
            .enumerate()
            .filter(|(i, &(x, y))| {
                !used[*i] && (x as f64 * cos_t + y as f64 * sin_t - rho).abs() < 1.5
            })
            .map(|(i, &(x, y))| (x, y, i))
            .collect();
        if on_line.len() < 2 {
            continue;
        }

        // Order along the line direction
        let along = |p: &(i32, i32, usize)| -(p.0 as f64) * sin_t + p.1 as f64 * cos_t;
        on_line.sort_by(|a, b| along(a).total_cmp(&along(b)));

        let mut run_start = 0;
        for i in 1..=on_line.len() {
            let split = i == on_line.len() || {
                let dx = (on_line[i].0 - on_line[i - 1].0) as f64;
                let dy = (on_line[i].1 - on_line[i - 1].1) as f64;
                (dx * dx + dy * dy).sqrt() > max_line_gap
            };
            if !split {
                continue;
            }
            if i - run_start >= 2 {
                let a = on_line[run_start];
                let b = on_line[i - 1];
                let segment = Segment {
                    start: (a.0, a.1),
                    end: (b.0, b.1),
                };
                if segment.length() >= min_line_length {
                    segments.push(segment);
                    for p in &on_line[run_start..i] {
                        used[p.2] = true;
                    }
                }
            }
            run_start = i;
        }
    }

    segments
}

/// Keep long segments whose midpoint lies inside the outline
///
/// With no outline every long segment qualifies.
pub fn select_bend_lines(
    segments: &[Segment],
    outline: &[Point2<f64>],
    config: &DetectionConfig,
) -> Vec<BendLine> {
    segments
        .iter()
        .filter(|s| s.length() >= config.bend_min_length)
        .filter(|s| {
            outline.len() < 3
                || signed_distance_to_contour(&s.midpoint(), outline) >= config.bend_inset_px
        })
        .map(|s| BendLine {
            line: [
                Point2D::new(s.start.0 as f64, s.start.1 as f64),
                Point2D::new(s.end.0 as f64, s.end.1 as f64),
            ],
            confidence: (s.length() / 200.0).min(1.0),
        })
        .collect()
}

/// Edges, then Hough segments, then bend-line selection
pub fn detect_bend_lines(
    edges: &GrayImage,
    outline: &[Point2<f64>],
    config: &DetectionConfig,
) -> Vec<BendLine> {
    let segments = detect_segments(
        edges,
        config.line_threshold,
        config.line_min_length,
        config.line_max_gap,
    );
    select_bend_lines(&segments, outline, config)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hole detection as an ordered chain of strategies
//!
//! The first strategy that finds at least one hole wins:
//!
//! 1. separate blobs: circular external contours other than the part itself
//! 2. hierarchy: circular descendants of the largest contour, de-duplicated
//! 3. Hough circles: circle transform on the grayscale image, kept only well
//!    inside the outline

use crate::circle_ops::{hough_circles, CircleParams};
use crate::contour_ops::{min_enclosing_circle, ContourSet};
use crate::types::{DetectionConfig, Hole, Point2D};
use image::GrayImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use sketchpart_geometry::bool2d::signed_distance_to_contour;
use tracing::debug;

/// Which strategy produced the holes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleTier {
    ExternalContours,
    Hierarchy,
    HoughCircles,
}

impl HoleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoleTier::ExternalContours => "external_contours",
            HoleTier::Hierarchy => "hierarchy",
            HoleTier::HoughCircles => "hough_circles",
        }
    }
}

/// Outcome of running one strategy or the whole chain
#[derive(Debug, Clone, PartialEq)]
pub enum HoleDetection {
    Found { tier: HoleTier, holes: Vec<Hole> },
    NoMatch,
}

impl HoleDetection {
    pub fn holes(&self) -> &[Hole] {
        match self {
            HoleDetection::Found { holes, .. } => holes,
            HoleDetection::NoMatch => &[],
        }
    }

    pub fn into_holes(self) -> Vec<Hole> {
        match self {
            HoleDetection::Found { holes, .. } => holes,
            HoleDetection::NoMatch => Vec::new(),
        }
    }

    pub fn tier(&self) -> Option<HoleTier> {
        match self {
            HoleDetection::Found { tier, .. } => Some(*tier),
            HoleDetection::NoMatch => None,
        }
    }
}

/// Everything a strategy may look at
pub struct HoleContext<'a> {
    pub gray: &'a GrayImage,
    pub contours: &'a ContourSet,
    pub config: &'a DetectionConfig,
}

/// One link in the hole detection chain
pub trait HoleStrategy {
    fn tier(&self) -> HoleTier;

    /// Return candidates; an empty list passes control to the next strategy
    fn find(&self, ctx: &HoleContext<'_>) -> Vec<Hole>;

    fn detect(&self, ctx: &HoleContext<'_>) -> HoleDetection {
        let holes = self.find(ctx);
        if holes.is_empty() {
            HoleDetection::NoMatch
        } else {
            HoleDetection::Found {
                tier: self.tier(),
                holes,
            }
        }
    }
}

/// Circular external contours that are not the part itself
pub struct ExternalContourHoles;

impl HoleStrategy for ExternalContourHoles {
    fn tier(&self) -> HoleTier {
        HoleTier::ExternalContours
    }

    fn find(&self, ctx: &HoleContext<'_>) -> Vec<Hole> {
        let external = ctx.contours.top_level();
        let max_area = external
            .iter()
            .map(|&i| ctx.contours.get(i).area)
            .fold(0.0, f64::max);

        external
            .into_iter()
            .filter(|&i| !(max_area > 0.0 && ctx.contours.get(i).area >= max_area * ctx.config.hole_exclusion_ratio))
            .filter_map(|i| circular_hole(ctx, i))
            .collect()
    }
}

/// Circular descendants of the largest contour
pub struct HierarchyHoles;

impl HoleStrategy for HierarchyHoles {
    fn tier(&self) -> HoleTier {
        HoleTier::Hierarchy
    }

    fn find(&self, ctx: &HoleContext<'_>) -> Vec<Hole> {
        let Some(largest) = ctx.contours.largest(&ctx.contours.all()) else {
            return Vec::new();
        };
        let largest_area = ctx.contours.get(largest).area;

        let holes: Vec<Hole> = ctx
            .contours
            .descendants(largest)
            .into_iter()
            .filter(|&i| {
                !(largest_area > 0.0
                    && ctx.contours.get(i).area > largest_area * ctx.config.hole_child_max_ratio)
            })
            .filter_map(|i| circular_hole(ctx, i))
            .collect();

        merge_nearby(holes)
    }
}

/// Circle transform fallback
pub struct HoughHoles;

impl HoleStrategy for HoughHoles {
    fn tier(&self) -> HoleTier {
        HoleTier::HoughCircles
    }

    fn find(&self, ctx: &HoleContext<'_>) -> Vec<Hole> {
        let config = ctx.config;
        let min_dim = ctx.gray.width().min(ctx.gray.height());
        let max_radius = ((min_dim as f64 * config.circle_max_radius_ratio) as u32)
            .max(config.circle_max_radius_floor);

        let params = CircleParams {
            dp: config.circle_dp,
            min_dist: config.circle_min_dist,
            param1: config.circle_param1,
            param2: config.circle_param2,
            min_radius: config.circle_min_radius,
            max_radius,
        };

        let outline: Option<Vec<Point2<f64>>> = ctx
            .contours
            .largest(&ctx.contours.top_level())
            .map(|i| ctx.contours.get(i).points.clone());

        let mut holes: Vec<Hole> = hough_circles(ctx.gray, &params)
            .into_iter()
            .filter(|c| match &outline {
                Some(contour) => signed_distance_to_contour(&c.center, contour) >= c.radius * 0.5,
                None => true,
            })
            .map(|c| Hole {
                center: Point2D::from_nalgebra(&c.center),
                radius: c.radius,
                confidence: 0.6,
            })
            .collect();

        if holes.len() > config.circle_max_count {
            holes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
            holes.truncate(config.circle_max_count);
        }
        holes
    }
}

/// Ordered strategies; the first non-empty result wins
pub struct HoleDetector {
    strategies: Vec<Box<dyn HoleStrategy>>,
}

impl Default for HoleDetector {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ExternalContourHoles),
            Box::new(HierarchyHoles),
            Box::new(HoughHoles),
        ])
    }
}

impl HoleDetector {
    pub fn new(strategies: Vec<Box<dyn HoleStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn detect(&self, ctx: &HoleContext<'_>) -> HoleDetection {
        for strategy in &self.strategies {
            let result = strategy.detect(ctx);
            if let HoleDetection::Found { tier, holes } = &result {
                debug!(tier = tier.as_str(), holes = holes.len(), "holes detected");
                return result;
            }
            debug!(tier = strategy.tier().as_str(), "no holes, falling through");
        }
        HoleDetection::NoMatch
    }
}

/// Area and circularity filters, then the min-enclosing circle
fn circular_hole(ctx: &HoleContext<'_>, index: usize) -> Option<Hole> {
    let contour = ctx.contours.get(index);
    if contour.area < ctx.config.hole_min_area {
        return None;
    }
    let circularity = contour.circularity()?;
    if circularity < ctx.config.hole_min_circularity {
        return None;
    }
    let (center, radius) = min_enclosing_circle(&contour.points)?;
    Some(Hole {
        center: Point2D::from_nalgebra(&center),
        radius,
        confidence: circularity.min(1.0),
    })
}

/// Collapse holes whose centers are closer than the larger radius, keeping the most confident
pub fn merge_nearby(holes: Vec<Hole>) -> Vec<Hole> {
    let mut used = vec![false; holes.len()];
    let mut merged = Vec::new();

    for i in 0..holes.len() {
        if used[i] {
            continue;
        }
        let mut best = &holes[i];
        for j in (i + 1)..holes.len() {
            if used[j] {
                continue;
            }
            let dist = holes[i].center.distance_to(&holes[j].center);
            if dist < holes[i].radius.max(holes[j].radius) {
                used[j] = true;
                if holes[j].confidence > best.confidence {
                    best = &holes[j];
                }
            }
        }
        merged.push(best.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;

    fn hole(x: f64, y: f64, r: f64, c: f64) -> Hole {
        Hole {
            center: Point2D::new(x, y),
            radius: r,
            confidence: c,
        }
    }

    fn run(binary: &GrayImage) -> HoleDetection {
        let contours = ContourSet::trace(binary);
        let config = DetectionConfig::default();
        let ctx = HoleContext {
            gray: binary,
            contours: &contours,
            config: &config,
        };
        HoleDetector::default().detect(&ctx)
    }

    #[test]
    fn test_merge_keeps_higher_confidence() {
        let merged = merge_nearby(vec![
            hole(10.0, 10.0, 5.0, 0.7),
            hole(12.0, 10.0, 5.0, 0.9),
            hole(50.0, 50.0, 5.0, 0.8),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].confidence, 0.9);
        assert_eq!(merged[1].center, Point2D::new(50.0, 50.0));
    }

    #[test]
    fn test_plate_with_two_holes_uses_hierarchy() {
        // Ink = 255 as after inverse thresholding
        let mut img = GrayImage::new(240, 160);
        draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(200, 120), Luma([255]));
        draw_filled_circle_mut(&mut img, (70, 80), 12, Luma([0]));
        draw_filled_circle_mut(&mut img, (170, 80), 12, Luma([0]));

        let detection = run(&img);
        assert_eq!(detection.tier(), Some(HoleTier::Hierarchy));
        let holes = detection.holes();
        assert_eq!(holes.len(), 2);
        for h in holes {
            assert!((h.center.y - 80.0).abs() < 2.0);
            assert!(h.radius > 10.0 && h.radius < 16.0);
            assert!(h.confidence >= 0.65);
        }
    }

    #[test]
    fn test_separate_disc_is_external_hole() {
        let mut img = GrayImage::new(300, 200);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(180, 180), Luma([255]));
        draw_filled_circle_mut(&mut img, (250, 100), 15, Luma([255]));

        let detection = run(&img);
        assert_eq!(detection.tier(), Some(HoleTier::ExternalContours));
        assert_eq!(detection.holes().len(), 1);
    }

    #[test]
    fn test_square_window_is_rejected_by_circularity() {
        // A thin slot has circularity well below 0.65
        let mut img = GrayImage::new(200, 120);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(180, 100), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(40, 55).of_size(100, 6), Luma([0]));

        let contours = ContourSet::trace(&img);
        let config = DetectionConfig::default();
        let ctx = HoleContext {
            gray: &img,
            contours: &contours,
            config: &config,
        };
        assert!(HierarchyHoles.find(&ctx).is_empty());
        assert!(ExternalContourHoles.find(&ctx).is_empty());
    }
}

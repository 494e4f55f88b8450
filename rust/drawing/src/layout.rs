// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Third-angle view placement
//!
//! Front view (width x thickness) sits at the origin, Top view (width x depth)
//! above it, Right view (depth x thickness) to its right. Views share the
//! same gap so projections stay aligned.

use sketchpart_model::PartModel;
use sketchpart_vision::Point2D;

/// Extent used when a model has no outline
const FALLBACK_EXTENT: (f64, f64) = (100.0, 60.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLayout {
    /// Outline minimum; model points are shifted by `-min` into each view
    pub min: Point2D,
    pub width: f64,
    pub depth: f64,
    pub thickness: f64,
    pub gap: f64,
    pub front_origin: Point2D,
    pub top_origin: Point2D,
    pub right_origin: Point2D,
}

impl ViewLayout {
    pub fn for_model(model: &PartModel) -> Self {
        let outline = &model.geometry.outline.points_mm;
        let (min, width, depth) = if outline.is_empty() {
            (Point2D::new(0.0, 0.0), FALLBACK_EXTENT.0, FALLBACK_EXTENT.1)
        } else {
            let min_x = outline.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let min_y = outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_x = outline.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let max_y = outline.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            (Point2D::new(min_x, min_y), max_x - min_x, max_y - min_y)
        };

        let width = width.max(1.0);
        let depth = depth.max(1.0);
        let thickness = model.thickness_mm();
        let gap = (0.25 * width.max(depth)).max(20.0);

        Self {
            min,
            width,
            depth,
            thickness,
            gap,
            front_origin: Point2D::new(0.0, 0.0),
            top_origin: Point2D::new(0.0, thickness + gap),
            right_origin: Point2D::new(width + gap, 0.0),
        }
    }

    /// Model point to Top view sheet coordinates
    pub fn to_top(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            p.x - self.min.x + self.top_origin.x,
            p.y - self.min.y + self.top_origin.y,
        )
    }

    /// Model x to Front view sheet x
    pub fn front_x(&self, x: f64) -> f64 {
        x - self.min.x + self.front_origin.x
    }

    /// Model y to Right view sheet x
    pub fn right_x(&self, y: f64) -> f64 {
        y - self.min.y + self.right_origin.x
    }

    /// Where the annotation block starts (top-left line)
    pub fn annotation_origin(&self) -> Point2D {
        Point2D::new(
            self.right_origin.x + self.depth + self.gap * 0.5,
            self.top_origin.y + self.depth,
        )
    }
}

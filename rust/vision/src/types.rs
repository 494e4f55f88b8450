// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for sketch feature extraction

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 2D point, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(xy: [f64; 2]) -> Self {
        Self::new(xy[0], xy[1])
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// Outline interpretation hint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    #[default]
    Polygon,
    Spline,
}

impl OutlineKind {
    /// Traced outlines with many vertices are treated as smooth curves
    pub fn from_point_count(count: usize) -> Self {
        if count > 20 {
            OutlineKind::Spline
        } else {
            OutlineKind::Polygon
        }
    }
}

/// Closed part boundary in pixel space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Outline {
    #[serde(rename = "type")]
    pub kind: OutlineKind,
    #[serde(rename = "points_px")]
    pub points: Vec<Point2D>,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Horizontal pixel extent, `None` when empty
    pub fn pixel_width(&self) -> Option<f64> {
        let min = self.points.iter().map(|p| p.x).reduce(f64::min)?;
        let max = self.points.iter().map(|p| p.x).reduce(f64::max)?;
        Some(max - min)
    }

    pub fn to_nalgebra(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(Point2D::to_nalgebra).collect()
    }
}

/// Detected circular hole
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hole {
    #[serde(rename = "center_px")]
    pub center: Point2D,
    #[serde(rename = "radius_px")]
    pub radius: f64,
    pub confidence: f64,
}

/// Detected straight bend line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BendLine {
    #[serde(rename = "line_px")]
    pub line: [Point2D; 2],
    pub confidence: f64,
}

impl BendLine {
    pub fn length(&self) -> f64 {
        self.line[0].distance_to(&self.line[1])
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.line[0].x + self.line[1].x) / 2.0,
            (self.line[0].y + self.line[1].y) / 2.0,
        )
    }
}

/// Features as captured from one image, before normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawFeatureSet {
    pub outline: Outline,
    pub holes: Vec<Hole>,
    pub bend_lines: Vec<BendLine>,
    #[serde(default)]
    pub notes_regions: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_hint_confidence: Option<f64>,
}

/// Configuration for the feature extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Gaussian blur sigma (a 3x3 kernel with automatic sigma)
    pub blur_sigma: f32,
    /// Morphological close radius (1 = 3x3 rectangle)
    pub close_radius: u8,
    /// Canny edge detection low threshold
    pub canny_low: f32,
    /// Canny edge detection high threshold
    pub canny_high: f32,
    /// Maximum number of outline points kept after resampling
    pub outline_max_points: usize,
    /// Minimum contour area for a hole candidate (square pixels)
    pub hole_min_area: f64,
    /// Minimum circularity for a hole candidate
    pub hole_min_circularity: f64,
    /// External contours at or above this fraction of the largest are not holes
    pub hole_exclusion_ratio: f64,
    /// Descendant contours above this fraction of the parent are not holes
    pub hole_child_max_ratio: f64,
    /// Hough circle accumulator resolution ratio
    pub circle_dp: f64,
    /// Minimum distance between detected circle centers
    pub circle_min_dist: f64,
    /// Upper Canny threshold for circle edges (lower is half)
    pub circle_param1: f32,
    /// Accumulator threshold for circle centers
    pub circle_param2: u32,
    /// Smallest circle radius searched
    pub circle_min_radius: u32,
    /// Largest radius as a fraction of the smaller image dimension
    pub circle_max_radius_ratio: f64,
    /// Floor for the largest radius
    pub circle_max_radius_floor: u32,
    /// Maximum number of Hough circles kept
    pub circle_max_count: usize,
    /// Hough line vote threshold
    pub line_threshold: u32,
    /// Minimum line length reported by the Hough transform
    pub line_min_length: f64,
    /// Maximum gap bridged within one line
    pub line_max_gap: f64,
    /// Minimum length of a bend line
    pub bend_min_length: f64,
    /// Bend midpoints must lie at least this far inside the outline
    pub bend_inset_px: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 0.8,
            close_radius: 1,
            canny_low: 50.0,
            canny_high: 150.0,
            outline_max_points: 1200,
            hole_min_area: 20.0,
            hole_min_circularity: 0.65,
            hole_exclusion_ratio: 0.9,
            hole_child_max_ratio: 0.5,
            circle_dp: 1.2,
            circle_min_dist: 15.0,
            circle_param1: 100.0,
            circle_param2: 25,
            circle_min_radius: 4,
            circle_max_radius_ratio: 0.25,
            circle_max_radius_floor: 20,
            circle_max_count: 50,
            line_threshold: 80,
            line_min_length: 40.0,
            line_max_gap: 5.0,
            bend_min_length: 50.0,
            bend_inset_px: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point2D::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
    }

    #[test]
    fn test_outline_kind_from_count() {
        assert_eq!(OutlineKind::from_point_count(4), OutlineKind::Polygon);
        assert_eq!(OutlineKind::from_point_count(20), OutlineKind::Polygon);
        assert_eq!(OutlineKind::from_point_count(21), OutlineKind::Spline);
    }

    #[test]
    fn test_raw_feature_set_field_names() {
        let raw = RawFeatureSet {
            outline: Outline {
                kind: OutlineKind::Polygon,
                points: vec![Point2D::new(0.0, 0.0)],
            },
            holes: vec![Hole {
                center: Point2D::new(3.0, 4.0),
                radius: 2.0,
                confidence: 0.9,
            }],
            bend_lines: vec![],
            ..Default::default()
        };
        let value = serde_json::to_value(&raw).unwrap();
        assert_eq!(value["outline"]["type"], "polygon");
        assert!(value["outline"]["points_px"].is_array());
        assert_eq!(value["holes"][0]["radius_px"], 2.0);
        assert!(value.get("part_hint").is_none());
    }

    #[test]
    fn test_pixel_width() {
        let outline = Outline {
            kind: OutlineKind::Polygon,
            points: vec![Point2D::new(20.0, 0.0), Point2D::new(220.0, 5.0), Point2D::new(50.0, 9.0)],
        };
        assert_eq!(outline.pixel_width(), Some(200.0));
        assert_eq!(Outline::default().pixel_width(), None);
    }
}

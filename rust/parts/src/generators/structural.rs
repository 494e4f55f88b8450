// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brackets, plates and frames built from rounded rectangles

use super::{combine, corner_rounded_rect, extrude, Args, GeneratorRegistry};
use crate::catalog::GeneratorBinding;
use crate::error::GeneratorResult;
use sketchpart_geometry::primitives::rotate_x;
use sketchpart_geometry::profile::{circle_contour, rounded_rectangle, translate_contour};
use sketchpart_geometry::{Mesh, Point2, Profile2D, SynthesisWarning, Vector3};
use sketchpart_model::ParameterMap;
use std::f64::consts::FRAC_PI_2;

const HOLE_SEGMENTS: usize = 32;
/// Distance of bracket holes from the flange ends
const BRACKET_HOLE_MARGIN: f64 = 10.0;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register(GeneratorBinding::new("structural", "bracket"), bracket);
    registry.register(GeneratorBinding::new("structural", "plate"), plate);
    registry.register(GeneratorBinding::new("structural", "frame"), frame);
}

/// Which holes a plate gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolePattern {
    Corners,
    Edges,
    Center,
    None,
}

impl HolePattern {
    /// Unknown names mean no holes
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "corners" => HolePattern::Corners,
            "edges" => HolePattern::Edges,
            "center" | "centre" => HolePattern::Center,
            _ => HolePattern::None,
        }
    }

    /// Hole centers on a `width` x `height` plate anchored at the origin
    pub fn positions(&self, width: f64, height: f64, margin: f64) -> Vec<Point2<f64>> {
        match self {
            HolePattern::Corners => vec![
                Point2::new(margin, margin),
                Point2::new(width - margin, margin),
                Point2::new(margin, height - margin),
                Point2::new(width - margin, height - margin),
            ],
            HolePattern::Edges => vec![
                Point2::new(margin, height / 2.0),
                Point2::new(width - margin, height / 2.0),
                Point2::new(width / 2.0, margin),
                Point2::new(width / 2.0, height - margin),
            ],
            HolePattern::Center => vec![Point2::new(width / 2.0, height / 2.0)],
            HolePattern::None => Vec::new(),
        }
    }
}

fn with_holes(outline: Vec<Point2<f64>>, centers: &[Point2<f64>], radius: f64) -> Profile2D {
    let mut profile = Profile2D::new(outline);
    if radius > 0.0 {
        for c in centers {
            profile.add_hole(circle_contour(*c, radius, HOLE_SEGMENTS));
        }
    }
    profile
}

/// L bracket: a horizontal flange on z = 0 and a vertical flange standing on
/// its y = 0 edge, each with two holes
pub fn bracket(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let width = args.positive("width_mm", 60.0)?;
    let height = args.positive("height_mm", 40.0)?;
    let depth = args.positive("depth_mm", 40.0)?;
    let thickness = args.positive("thickness_mm", 3.0)?;
    let hole_r = args.non_negative("hole_diameter_mm", 5.0) / 2.0;
    let corner = args.non_negative("corner_radius_mm", 3.0);

    let flange = |span: f64| {
        let holes = [
            Point2::new(BRACKET_HOLE_MARGIN, span / 2.0),
            Point2::new(width - BRACKET_HOLE_MARGIN, span / 2.0),
        ];
        with_holes(corner_rounded_rect(width, span, corner), &holes, hole_r)
    };

    let horizontal = extrude(&flange(depth), 0.0, thickness)?;

    // Stand the second flange up: its y becomes z, its extrusion runs along -y
    let mut vertical = extrude(&flange(height), 0.0, thickness)?;
    rotate_x(&mut vertical, FRAC_PI_2);
    vertical.translate(Vector3::new(0.0, thickness, thickness));

    combine(vec![horizontal, vertical])
}

pub fn plate(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let width = args.positive("width_mm", 100.0)?;
    let height = args.positive("height_mm", 60.0)?;
    let thickness = args.positive("thickness_mm", 3.0)?;
    let corner = args.non_negative("corner_radius_mm", 3.0);
    let pattern_name = args.text("hole_pattern", "corners");
    let hole_r = args.non_negative("hole_diameter_mm", 5.0) / 2.0;
    let margin = args.non_negative("hole_margin_mm", 10.0);

    let pattern = HolePattern::parse(pattern_name);
    if pattern == HolePattern::None && !pattern_name.eq_ignore_ascii_case("none") {
        warnings.push(SynthesisWarning::parameter(format!(
            "unknown hole_pattern {pattern_name:?}, plate left without holes"
        )));
    }

    let centers = pattern.positions(width, height, margin);
    let profile = with_holes(corner_rounded_rect(width, height, corner), &centers, hole_r);
    extrude(&profile, 0.0, thickness)
}

/// Rectangular frame: outer rounded rectangle minus a centered opening
pub fn frame(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let outer_w = args.positive("outer_width_mm", 120.0)?;
    let outer_h = args.positive("outer_height_mm", 80.0)?;
    let wall = args.positive("wall_thickness_mm", 10.0)?;
    let depth = args.positive("depth_mm", 5.0)?;
    let corner = args.non_negative("corner_radius_mm", 5.0);
    let mounting_holes = args.flag("mounting_holes", true);
    let hole_r = args.non_negative("hole_diameter_mm", 5.0) / 2.0;

    let centers = if mounting_holes {
        HolePattern::Corners.positions(outer_w, outer_h, wall / 2.0)
    } else {
        Vec::new()
    };
    let mut profile = with_holes(corner_rounded_rect(outer_w, outer_h, corner), &centers, hole_r);

    let inner_w = outer_w - 2.0 * wall;
    let inner_h = outer_h - 2.0 * wall;
    if inner_w > 0.0 && inner_h > 0.0 {
        let inner_radius = (corner - wall / 2.0).max(1.0);
        let opening = rounded_rectangle(inner_w, inner_h, inner_radius, 8);
        profile.add_hole(translate_contour(&opening, outer_w / 2.0, outer_h / 2.0));
    }
    extrude(&profile, 0.0, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ParameterMap {
        ParameterMap::from_value(value)
    }

    #[test]
    fn test_bracket_flanges_meet_at_right_angle() {
        let mesh = bracket(&params(json!({})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.min.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.x, 60.0, epsilon = 1e-4);
        assert_relative_eq!(b.min.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.y, 40.0, epsilon = 1e-4);
        assert_relative_eq!(b.min.z, 0.0, epsilon = 1e-4);
        // Vertical flange rises from the top of the horizontal one
        assert_relative_eq!(b.max.z, 43.0, epsilon = 1e-4);
    }

    #[test]
    fn test_hole_patterns() {
        assert_eq!(HolePattern::parse("Corners"), HolePattern::Corners);
        assert_eq!(HolePattern::parse("zigzag"), HolePattern::None);
        let edges = HolePattern::Edges.positions(100.0, 60.0, 10.0);
        assert!(edges.contains(&Point2::new(50.0, 10.0)));
        assert!(edges.contains(&Point2::new(90.0, 30.0)));
        assert_eq!(HolePattern::Center.positions(100.0, 60.0, 10.0), vec![Point2::new(50.0, 30.0)]);
    }

    #[test]
    fn test_plate_pattern_warning() {
        let mut warnings = Vec::new();
        let mesh = plate(&params(json!({"hole_pattern": "zigzag"})), &mut warnings).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.y, 60.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.z, 3.0, epsilon = 1e-4);
        assert_eq!(warnings.len(), 1);

        let mut warnings = Vec::new();
        plate(&params(json!({"hole_pattern": "none"})), &mut warnings).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_holes_add_triangles() {
        let plain = plate(&params(json!({"hole_pattern": "none"})), &mut Vec::new()).unwrap();
        let drilled = plate(&params(json!({"hole_pattern": "corners"})), &mut Vec::new()).unwrap();
        assert!(drilled.triangle_count() > plain.triangle_count());
    }

    #[test]
    fn test_frame_extent() {
        let mesh = frame(&params(json!({"outer_width_mm": 100, "outer_height_mm": 50, "depth_mm": 4})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(b.size().y, 50.0, epsilon = 1e-4);
        assert_relative_eq!(b.size().z, 4.0, epsilon = 1e-4);
    }
}

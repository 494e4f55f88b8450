// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use std::f64::consts::{FRAC_PI_2, PI};

/// 2D Profile with optional holes
#[derive(Debug, Clone, Default)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Builder variant of [`Profile2D::add_hole`]
    pub fn with_hole(mut self, hole: Vec<Point2<f64>>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Shift every contour by `offset`
    pub fn translate(&mut self, offset: Vector2<f64>) {
        for p in self.outer.iter_mut() {
            *p += offset;
        }
        for hole in self.holes.iter_mut() {
            for p in hole.iter_mut() {
                *p += offset;
            }
        }
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(
            (self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()) * 2,
        );

        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let mut hole_indices = Vec::with_capacity(self.holes.len());
        for hole in self.holes.iter().filter(|h| h.len() >= 3) {
            hole_indices.push(vertices.len() / 2);
            for p in hole {
                vertices.push(p.x);
                vertices.push(p.y);
            }
        }

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "earcut produced no triangles".to_string(),
            ));
        }

        let points = vertices
            .chunks_exact(2)
            .map(|xy| Point2::new(xy[0], xy[1]))
            .collect();

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Create a rectangular profile centered on the origin
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Profile2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// Create a circular profile centered on the origin, with optional bore
pub fn create_circle(radius: f64, hole_radius: Option<f64>, segments: usize) -> Profile2D {
    let mut profile = Profile2D::new(circle_contour(Point2::origin(), radius, segments));

    if let Some(hole_r) = hole_radius.filter(|r| *r > 0.0 && *r < radius) {
        let mut hole = circle_contour(Point2::origin(), hole_r, segments);
        hole.reverse();
        profile.add_hole(hole);
    }

    profile
}

/// Counter-clockwise polygonal circle starting at angle 0
pub fn circle_contour(center: Point2<f64>, radius: f64, segments: usize) -> Vec<Point2<f64>> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (segments as f64);
            Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Regular polygon with its first vertex at `start_angle` (radians)
pub fn regular_polygon(radius: f64, sides: usize, start_angle: f64) -> Vec<Point2<f64>> {
    let sides = sides.max(3);
    (0..sides)
        .map(|i| {
            let angle = start_angle + 2.0 * PI * (i as f64) / (sides as f64);
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Hexagon described by its across-flats distance, flats parallel to Y
pub fn hexagon_across_flats(across_flats: f64) -> Vec<Point2<f64>> {
    regular_polygon(across_flats / 3.0_f64.sqrt(), 6, PI / 6.0)
}

/// Rectangle centered on the origin with filleted corners
///
/// Each corner contributes `segments + 1` points sweeping a quarter turn,
/// starting with the top-right corner at 0 rad.
pub fn rounded_rectangle(width: f64, height: f64, radius: f64, segments: usize) -> Vec<Point2<f64>> {
    let radius = radius.max(0.0).min(width / 2.0).min(height / 2.0);
    if radius <= 1e-9 {
        return create_rectangle(width, height).outer;
    }

    let segments = segments.max(1);
    let hw = width / 2.0 - radius;
    let hh = height / 2.0 - radius;
    let corners = [
        (Point2::new(hw, hh), 0.0),
        (Point2::new(-hw, hh), FRAC_PI_2),
        (Point2::new(-hw, -hh), PI),
        (Point2::new(hw, -hh), 3.0 * FRAC_PI_2),
    ];

    let mut points = Vec::with_capacity(4 * (segments + 1));
    for (center, start) in corners {
        for i in 0..=segments {
            let angle = start + FRAC_PI_2 * (i as f64) / (segments as f64);
            points.push(Point2::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ));
        }
    }
    points
}

/// Translate a contour by `(dx, dy)`
pub fn translate_contour(contour: &[Point2<f64>], dx: f64, dy: f64) -> Vec<Point2<f64>> {
    contour.iter().map(|p| Point2::new(p.x + dx, p.y + dy)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool2d::compute_signed_area;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(10.0, 5.0);
        assert_eq!(profile.outer.len(), 4);
        assert_eq!(profile.holes.len(), 0);
        assert_eq!(profile.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
    }

    #[test]
    fn test_circle_profile_with_bore() {
        let profile = create_circle(10.0, Some(5.0), 32);
        assert_eq!(profile.outer.len(), 32);
        assert_eq!(profile.holes.len(), 1);
        assert!(compute_signed_area(&profile.holes[0]) < 0.0);

        let first = profile.outer[0];
        assert_relative_eq!(first.coords.norm(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bore_larger_than_disc_is_ignored() {
        let profile = create_circle(5.0, Some(6.0), 16);
        assert!(profile.holes.is_empty());
    }

    #[test]
    fn test_triangulate_rectangle() {
        let tri = create_rectangle(10.0, 5.0).triangulate().unwrap();
        assert_eq!(tri.points.len(), 4);
        assert_eq!(tri.indices.len(), 6);
    }

    #[test]
    fn test_triangulate_annulus() {
        let tri = create_circle(10.0, Some(5.0), 24).triangulate().unwrap();
        assert_eq!(tri.points.len(), 48);
        // An annulus with n + n vertices triangulates into 2n triangles
        assert_eq!(tri.indices.len(), 48 * 3);
    }

    #[test]
    fn test_triangulate_rejects_degenerate() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        assert!(profile.triangulate().is_err());
    }

    #[test]
    fn test_hexagon_across_flats() {
        let hex = hexagon_across_flats(8.0);
        assert_eq!(hex.len(), 6);
        let max_x = hex.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        // Flats are parallel to Y, so the half-width is half the flat distance
        assert_relative_eq!(max_x, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rounded_rectangle_extent_and_winding() {
        let pts = rounded_rectangle(100.0, 60.0, 5.0, 8);
        assert_eq!(pts.len(), 36);
        let max_x = pts.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let min_y = pts.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        assert_relative_eq!(max_x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(min_y, -30.0, epsilon = 1e-9);
        assert!(compute_signed_area(&pts) > 0.0);
    }
}

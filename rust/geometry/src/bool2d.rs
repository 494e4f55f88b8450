// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for outline repair and hole subtraction
//!
//! Sketch outlines traced from raster images are frequently self-touching or
//! self-intersecting. Running them through i_overlay with an empty clip set
//! rebuilds valid, non-overlapping contours (the equivalent of a zero-width
//! buffer) before they are triangulated and extruded.

use crate::error::{Error, Result};
use crate::profile::Profile2D;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Rebuild a profile so that it is a valid simple polygon with holes.
///
/// Holes are subtracted from the outer boundary in the same pass. When the
/// overlay splits the input into several pieces, the largest one is kept.
pub fn repair_profile(profile: &Profile2D) -> Result<Profile2D> {
    if profile.outer.len() < 3 {
        return Err(Error::InvalidProfile(
            "Profile must have at least 3 vertices".to_string(),
        ));
    }

    let subject: Vec<Vec<[f64; 2]>> = vec![contour_to_path(&profile.outer)];
    let clip: Vec<Vec<[f64; 2]>> = profile
        .holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| contour_to_path(h))
        .collect();

    // An empty clip set leaves only the rebuilt subject
    let result = subject.overlay(&clip, OverlayRule::Difference, FillRule::NonZero);

    shapes_to_profile(&result)
}

/// True when two non-adjacent edges of the closed contour cross or touch
pub fn is_self_intersecting(contour: &[Point2<f64>]) -> bool {
    let n = contour.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let a0 = contour[i];
        let a1 = contour[(i + 1) % n];
        for j in (i + 2)..n {
            // First and last edges share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = contour[j];
            let b1 = contour[(j + 1) % n];
            if segments_intersect(&a0, &a1, &b0, &b1) {
                return true;
            }
        }
    }

    false
}

fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

#[inline]
fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn on_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Signed distance from a point to a closed contour.
///
/// Positive inside, negative outside, zero on the boundary.
pub fn signed_distance_to_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> f64 {
    if contour.is_empty() {
        return f64::NEG_INFINITY;
    }

    let n = contour.len();
    let mut min_dist = f64::MAX;
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        min_dist = min_dist.min(point_segment_distance(point, &a, &b));
    }

    if min_dist < 1e-12 {
        0.0
    } else if point_in_contour(point, contour) {
        min_dist
    } else {
        -min_dist
    }
}

/// Distance from a point to a line segment
pub fn point_segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-20 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to Profile2D
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_profile(shapes: &[Vec<Vec<[f64; 2]>>]) -> Result<Profile2D> {
    let best_shape = shapes
        .iter()
        .filter(|shape| !shape.is_empty())
        .map(|shape| (shape, compute_signed_area(&path_to_contour(&shape[0])).abs()))
        .filter(|(_, area)| *area > MIN_AREA_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(shape, _)| shape)
        .ok_or_else(|| {
            Error::InvalidProfile("Boolean operation resulted in empty geometry".to_string())
        })?;

    let outer = ensure_ccw(&path_to_contour(&best_shape[0]));

    let holes = best_shape
        .iter()
        .skip(1)
        .map(|contour| path_to_contour(contour))
        .filter(|hole| is_valid_contour(hole))
        .map(|hole| ensure_cw(&hole))
        .collect();

    Ok(Profile2D { outer, holes })
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour hierarchy and shape measures
//!
//! Contours come from imageproc's border following (Suzuki-Abe), which
//! yields both outer and hole borders together with their parent links.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use nalgebra::Point2;
use std::collections::VecDeque;
use std::f64::consts::PI;

/// One traced border with precomputed measures
#[derive(Debug, Clone)]
pub struct TracedContour {
    pub points: Vec<Point2<f64>>,
    pub parent: Option<usize>,
    pub is_hole: bool,
    pub area: f64,
    pub perimeter: f64,
}

impl TracedContour {
    fn new(points: Vec<Point2<f64>>, parent: Option<usize>, is_hole: bool) -> Self {
        let area = polygon_area(&points);
        let perimeter = closed_perimeter(&points);
        Self {
            points,
            parent,
            is_hole,
            area,
            perimeter,
        }
    }

    /// 4π·area/perimeter², `None` when the perimeter is zero
    pub fn circularity(&self) -> Option<f64> {
        circularity(self.area, self.perimeter)
    }
}

/// All contours of a binary image with their hierarchy
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    contours: Vec<TracedContour>,
    children: Vec<Vec<usize>>,
}

impl ContourSet {
    /// Trace every border of the non-zero regions of `binary`
    pub fn trace(binary: &GrayImage) -> Self {
        let traced = find_contours::<i32>(binary);
        let contours: Vec<TracedContour> = traced
            .into_iter()
            .map(|c| {
                let points = c
                    .points
                    .iter()
                    .map(|p| Point2::new(p.x as f64, p.y as f64))
                    .collect();
                TracedContour::new(points, c.parent, c.border_type == BorderType::Hole)
            })
            .collect();
        Self::from_contours(contours)
    }

    fn from_contours(contours: Vec<TracedContour>) -> Self {
        let mut children = vec![Vec::new(); contours.len()];
        for (i, c) in contours.iter().enumerate() {
            if let Some(parent) = c.parent.filter(|p| *p < contours.len()) {
                children[parent].push(i);
            }
        }
        Self { contours, children }
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> &TracedContour {
        &self.contours[index]
    }

    /// Outer borders without a parent (what an "external only" retrieval sees)
    pub fn top_level(&self) -> Vec<usize> {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent.is_none() && !c.is_hole)
            .map(|(i, _)| i)
            .collect()
    }

    /// Every contour index
    pub fn all(&self) -> Vec<usize> {
        (0..self.contours.len()).collect()
    }

    /// Index with the largest area among `candidates`; first wins on ties
    pub fn largest(&self, candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().fold(None, |best, i| match best {
            Some(b) if self.contours[b].area >= self.contours[i].area => Some(b),
            _ => Some(i),
        })
    }

    /// Breadth-first list of all descendants of `root`
    pub fn descendants(&self, root: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut queue: VecDeque<usize> = self.children[root].iter().copied().collect();
        while let Some(i) = queue.pop_front() {
            result.push(i);
            queue.extend(self.children[i].iter().copied());
        }
        result
    }
}

/// Absolute polygon area (shoelace)
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    sketchpart_geometry::bool2d::compute_signed_area(points).abs()
}

/// Length of the closed polyline through `points`
pub fn closed_perimeter(points: &[Point2<f64>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .sum()
}

/// 4π·area/perimeter²; 1.0 for a perfect circle
pub fn circularity(area: f64, perimeter: f64) -> Option<f64> {
    if perimeter <= 0.0 {
        return None;
    }
    Some(4.0 * PI * area / (perimeter * perimeter))
}

/// Resample to at most `max_points` with a uniform index stride
pub fn resample_uniform<T: Copy>(points: &[T], max_points: usize) -> Vec<T> {
    if points.len() <= max_points || max_points == 0 {
        return points.to_vec();
    }
    let step = points.len() as f64 / max_points as f64;
    (0..max_points)
        .map(|i| points[((i as f64 * step) as usize).min(points.len() - 1)])
        .collect()
}

/// Smallest circle containing every point (incremental Welzl, deterministic order)
pub fn min_enclosing_circle(points: &[Point2<f64>]) -> Option<(Point2<f64>, f64)> {
    let first = *points.first()?;
    let mut center = first;
    let mut radius = 0.0;
    let eps = 1e-7;

    for i in 1..points.len() {
        if (points[i] - center).norm() <= radius + eps {
            continue;
        }
        center = points[i];
        radius = 0.0;
        for j in 0..i {
            if (points[j] - center).norm() <= radius + eps {
                continue;
            }
            center = nalgebra::center(&points[i], &points[j]);
            radius = (points[i] - center).norm();
            for k in 0..j {
                if (points[k] - center).norm() <= radius + eps {
                    continue;
                }
                match circumcircle(&points[i], &points[j], &points[k]) {
                    Some((c, r)) => {
                        center = c;
                        radius = r;
                    }
                    None => {
                        // Collinear: span the farthest pair
                        let pairs = [
                            (points[i], points[j]),
                            (points[i], points[k]),
                            (points[j], points[k]),
                        ];
                        let (a, b) = pairs
                            .into_iter()
                            .max_by(|p, q| (p.0 - p.1).norm().total_cmp(&(q.0 - q.1).norm()))
                            .unwrap_or(pairs[0]);
                        center = nalgebra::center(&a, &b);
                        radius = (a - center).norm();
                    }
                }
            }
        }
    }

    Some((center, radius))
}

fn circumcircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<(Point2<f64>, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.coords.norm_squared();
    let b2 = b.coords.norm_squared();
    let c2 = c.coords.norm_squared();
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point2::new(ux, uy);
    Some((center, (a - center).norm()))
}

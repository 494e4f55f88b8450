// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raised rings around fastening holes

use sketchpart_geometry::extrusion::extrude_profile_at;
use sketchpart_geometry::profile::circle_contour;
use sketchpart_geometry::{Mesh, Point2, Profile2D, Result};

/// A ring standing on the top face, concentric with a hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    /// Added to the hole radius for the ring's outer radius
    pub radial_margin_mm: f64,
    pub height_ratio: f64,
    pub min_height_mm: f64,
    pub segments: usize,
}

/// Boss around link and base bolt holes
pub const BOSS: RingSpec = RingSpec {
    radial_margin_mm: 4.0,
    height_ratio: 0.4,
    min_height_mm: 2.0,
    segments: 48,
};

/// Collar around a joint's shaft bore
pub const COLLAR: RingSpec = RingSpec {
    radial_margin_mm: 6.0,
    height_ratio: 0.5,
    min_height_mm: 3.0,
    segments: 72,
};

/// Stand-off under a base plate's corner holes
pub const STANDOFF: RingSpec = RingSpec {
    radial_margin_mm: 3.0,
    height_ratio: 0.6,
    min_height_mm: 3.0,
    segments: 36,
};

impl RingSpec {
    pub fn height(&self, thickness: f64) -> f64 {
        self.min_height_mm.max(thickness * self.height_ratio)
    }

    pub fn outer_radius(&self, hole_radius: f64) -> f64 {
        hole_radius + self.radial_margin_mm
    }

    /// Ring from `z = thickness` up, bored to the hole radius
    pub fn build(&self, center: Point2<f64>, hole_radius: f64, thickness: f64) -> Result<Mesh> {
        let profile = Profile2D::new(circle_contour(
            center,
            self.outer_radius(hole_radius),
            self.segments,
        ))
        .with_hole(circle_contour(center, hole_radius, self.segments));
        extrude_profile_at(&profile, thickness, self.height(thickness))
    }
}

/// Merge one ring per hole into `mesh`; returns how many were added
pub fn add_rings(
    mesh: &mut Mesh,
    spec: &RingSpec,
    holes: &[(Point2<f64>, f64)],
    thickness: f64,
) -> usize {
    let mut added = 0;
    for (center, radius) in holes {
        match spec.build(*center, *radius, thickness) {
            Ok(ring) => {
                mesh.merge(&ring);
                added += 1;
            }
            Err(e) => tracing::debug!(error = %e, "ring skipped"),
        }
    }
    added
}

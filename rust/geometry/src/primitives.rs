// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed solid primitives in millimeters
//!
//! All primitives stand on z = 0 unless stated otherwise. Invalid sizes
//! produce an empty mesh instead of an error; callers check `is_empty()`.

use crate::extrusion::extrude_profile;
use crate::mesh::Mesh;
use crate::profile::{create_circle, Profile2D};
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;

/// Axis-aligned box spanning `0..sx`, `0..sy`, `0..sz`
pub fn box_mesh(sx: f64, sy: f64, sz: f64) -> Mesh {
    let outline = vec![
        Point2::new(0.0, 0.0),
        Point2::new(sx, 0.0),
        Point2::new(sx, sy),
        Point2::new(0.0, sy),
    ];
    prism(&Profile2D::new(outline), sz)
}

/// Axis-aligned box with the given center and size
pub fn box_centered(center: Point3<f64>, size: Vector3<f64>) -> Mesh {
    let mut mesh = box_mesh(size.x, size.y, size.z);
    mesh.translate(center.coords - size / 2.0);
    mesh
}

/// Solid cylinder around the Z axis spanning `0..height`
pub fn cylinder(radius: f64, height: f64, segments: usize) -> Mesh {
    if radius <= 0.0 {
        return Mesh::new();
    }
    prism(&create_circle(radius, None, segments), height)
}

/// Hollow cylinder (tube) around the Z axis; falls back to a solid cylinder
/// when the bore is not smaller than the outer radius
pub fn tube(outer_radius: f64, inner_radius: f64, height: f64, segments: usize) -> Mesh {
    if outer_radius <= 0.0 {
        return Mesh::new();
    }
    prism(
        &create_circle(outer_radius, Some(inner_radius), segments),
        height,
    )
}

/// Extrude a profile, returning an empty mesh when it is not extrudable
pub fn prism(profile: &Profile2D, height: f64) -> Mesh {
    extrude_profile(profile, height, None).unwrap_or_default()
}

/// Truncated cone around the Z axis from `z0` to `z0 + height`
pub fn frustum(bottom_radius: f64, top_radius: f64, height: f64, z0: f64, segments: usize) -> Mesh {
    if height <= 0.0 || bottom_radius < 0.0 || top_radius < 0.0 {
        return Mesh::new();
    }
    let segments = segments.max(3);
    let z1 = z0 + height;
    let ring = |r: f64, z: f64| -> Vec<Point3<f64>> {
        (0..segments)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / segments as f64;
                Point3::new(r * a.cos(), r * a.sin(), z)
            })
            .collect()
    };
    let bottom = ring(bottom_radius, z0);
    let top = ring(top_radius, z1);

    let mut mesh = Mesh::with_capacity(segments * 6 + 2, segments * 12);

    // Caps as fans around the axis
    let down = Vector3::new(0.0, 0.0, -1.0);
    let up = Vector3::new(0.0, 0.0, 1.0);
    let base = mesh.vertex_count() as u32;
    mesh.add_vertex(Point3::new(0.0, 0.0, z0), down);
    for p in &bottom {
        mesh.add_vertex(*p, down);
    }
    for i in 0..segments as u32 {
        let j = (i + 1) % segments as u32;
        mesh.add_triangle(base, base + 1 + j, base + 1 + i);
    }

    let base = mesh.vertex_count() as u32;
    mesh.add_vertex(Point3::new(0.0, 0.0, z1), up);
    for p in &top {
        mesh.add_vertex(*p, up);
    }
    for i in 0..segments as u32 {
        let j = (i + 1) % segments as u32;
        mesh.add_triangle(base, base + 1 + i, base + 1 + j);
    }

    // Side quads
    for i in 0..segments {
        let j = (i + 1) % segments;
        let mid = nalgebra::center(&bottom[i], &bottom[j]);
        let normal = Vector3::new(mid.x, mid.y, 0.0)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::x);
        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(bottom[i], normal);
        mesh.add_vertex(bottom[j], normal);
        mesh.add_vertex(top[j], normal);
        mesh.add_vertex(top[i], normal);
        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }

    mesh
}

/// Rotation of a mesh about the X axis by `angle` radians
pub fn rotate_x(mesh: &mut Mesh, angle: f64) {
    let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), angle);
    crate::extrusion::apply_transform(mesh, &rotation.to_homogeneous());
}

/// Rotation of a mesh about the Z axis by `angle` radians
pub fn rotate_z(mesh: &mut Mesh, angle: f64) {
    let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), angle);
    crate::extrusion::apply_transform(mesh, &rotation.to_homogeneous());
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_bounds() {
        let mesh = box_mesh(10.0, 20.0, 3.0);
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.min.x, 0.0);
        assert_relative_eq!(b.max.y, 20.0);
        assert_relative_eq!(b.max.z, 3.0);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_box_centered() {
        let mesh = box_centered(Point3::new(0.0, 5.0, 1.0), Vector3::new(4.0, 2.0, 2.0));
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.min.x, -2.0);
        assert_relative_eq!(b.min.y, 4.0);
        assert_relative_eq!(b.max.z, 2.0);
    }

    #[test]
    fn test_cylinder_extent() {
        let mesh = cylinder(4.0, 10.0, 48);
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(b.max.z, 10.0, epsilon = 1e-5);
        assert!(cylinder(0.0, 10.0, 48).is_empty());
    }

    #[test]
    fn test_frustum_extent() {
        let mesh = frustum(10.0, 6.0, 4.0, 2.0, 32);
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(b.min.z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(b.max.z, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_x_quarter_turn() {
        let mut mesh = box_mesh(10.0, 2.0, 5.0);
        rotate_x(&mut mesh, std::f64::consts::FRAC_PI_2);
        let b = mesh.bounds3().unwrap();
        // Height along Z becomes depth along -Y
        assert_relative_eq!(b.size().y, 5.0, epsilon = 1e-4);
        assert_relative_eq!(b.size().z, 2.0, epsilon = 1e-4);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes

use crate::bool2d::{ensure_ccw, ensure_cw};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Extrude a 2D profile along +Z from z = 0 to z = depth
#[inline]
pub fn extrude_profile(
    profile: &Profile2D,
    depth: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if !(depth > 0.0) || !depth.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "Depth must be positive, got {depth}"
        )));
    }

    // Winding decides which way walls face
    let outer = ensure_ccw(&profile.outer);
    let holes: Vec<Vec<Point2<f64>>> = profile
        .holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| ensure_cw(h))
        .collect();
    let oriented = Profile2D {
        outer,
        holes,
    };

    let triangulation = oriented.triangulate()?;

    let side_vertex_count = oriented.outer.len() * 4
        + oriented.holes.iter().map(|h| h.len() * 4).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + side_vertex_count,
        triangulation.indices.len() * 2 + side_vertex_count * 3 / 2,
    );

    create_cap_mesh(&triangulation, 0.0, true, &mut mesh);
    create_cap_mesh(&triangulation, depth, false, &mut mesh);

    create_side_walls(&oriented.outer, depth, &mut mesh);
    for hole in &oriented.holes {
        create_side_walls(hole, depth, &mut mesh);
    }

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    Ok(mesh)
}

/// Extrude a profile so the solid spans `z0 .. z0 + depth`
pub fn extrude_profile_at(profile: &Profile2D, z0: f64, depth: f64) -> Result<Mesh> {
    let transform = if z0 == 0.0 {
        None
    } else {
        Some(Matrix4::new_translation(&Vector3::new(0.0, 0.0, z0)))
    };
    extrude_profile(profile, depth, transform)
}

/// Create a cap mesh (top or bottom) from triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, bottom: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = if bottom {
        Vector3::new(0.0, 0.0, -1.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // earcut output is not winding-stable, so orient each triangle explicitly
        let a = triangulation.points[tri[0]];
        let b = triangulation.points[tri[1]];
        let c = triangulation.points[tri[2]];
        let ccw = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) > 0.0;

        if ccw != bottom {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

/// Create side walls for a profile boundary
///
/// Outer boundaries must be counter-clockwise and holes clockwise so that
/// every wall faces away from the material.
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let mut quad_count = 0u32;

    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        // Skip degenerate edges (duplicate consecutive points)
        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let idx = base_index + (quad_count * 4);
        mesh.add_vertex(Point3::new(p0.x, p0.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, depth), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, depth), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);

        quad_count += 1;
    }
}

/// Apply transformation matrix to mesh
#[inline]
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Normals use the inverse transpose
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous())
            .xyz()
            .try_normalize(1e-12)
            .unwrap_or(normal);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });
}

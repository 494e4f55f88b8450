// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh boolean difference via csgrs
//!
//! Cuts such as keyways, hex sockets and bevel-gear bores are performed on
//! finished meshes. A cut that cannot be completed is not an error: callers
//! receive [`CutOutcome::Uncut`] carrying the original host mesh and the
//! reason, and decide how to surface it.

use crate::error::{Error, Result};
use crate::mesh::{face_normal, Mesh};
use crate::warning::SynthesisWarning;
use nalgebra::{Point3, Vector3};
use tracing::warn;

/// Result of a mesh difference that is allowed to degrade
#[derive(Debug, Clone)]
pub enum CutOutcome {
    /// The tool was subtracted from the host
    Cut(Mesh),
    /// The cut failed; the mesh is the unmodified host
    Uncut {
        mesh: Mesh,
        feature: String,
        reason: String,
    },
}

impl CutOutcome {
    /// Resulting mesh, cut or not
    pub fn into_mesh(self) -> Mesh {
        match self {
            CutOutcome::Cut(mesh) | CutOutcome::Uncut { mesh, .. } => mesh,
        }
    }

    pub fn is_cut(&self) -> bool {
        matches!(self, CutOutcome::Cut(_))
    }

    /// Failure reason for an uncut outcome
    pub fn failure(&self) -> Option<&str> {
        match self {
            CutOutcome::Cut(_) => None,
            CutOutcome::Uncut { reason, .. } => Some(reason),
        }
    }

    /// Resulting mesh; a failed cut is recorded in `warnings`
    pub fn into_mesh_noting(self, warnings: &mut Vec<SynthesisWarning>) -> Mesh {
        match self {
            CutOutcome::Cut(mesh) => mesh,
            CutOutcome::Uncut {
                mesh,
                feature,
                reason,
            } => {
                warnings.push(SynthesisWarning::BooleanFailed { feature, reason });
                mesh
            }
        }
    }
}

/// Subtract `tool` from `host`, falling back to the uncut host on failure.
///
/// `feature` names the cut for logging (e.g. `"keyway"`).
pub fn subtract_or_keep(host: &Mesh, tool: &Mesh, feature: &str) -> CutOutcome {
    match subtract_mesh(host, tool) {
        Ok(mesh) => CutOutcome::Cut(mesh),
        Err(e) => {
            warn!(feature, error = %e, "boolean difference failed, keeping uncut shape");
            CutOutcome::Uncut {
                mesh: host.clone(),
                feature: feature.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Subtract tool mesh from host mesh using csgrs CSG boolean operations
pub fn subtract_mesh(host_mesh: &Mesh, tool_mesh: &Mesh) -> Result<Mesh> {
    use csgrs::traits::CSG;

    if host_mesh.is_empty() {
        return Err(Error::EmptyMesh("host mesh has no triangles".to_string()));
    }
    if tool_mesh.is_empty() {
        return Err(Error::EmptyMesh("tool mesh has no triangles".to_string()));
    }

    let host_csg = mesh_to_csgrs(host_mesh)?;
    let tool_csg = mesh_to_csgrs(tool_mesh)?;

    let result_csg = host_csg.difference(&tool_csg);
    let result = csgrs_to_mesh(&result_csg)?;

    if result.is_empty() {
        return Err(Error::BooleanFailure(
            "difference produced an empty mesh".to_string(),
        ));
    }
    if result.positions.iter().any(|v| !v.is_finite()) {
        return Err(Error::BooleanFailure(
            "difference produced non-finite coordinates".to_string(),
        ));
    }

    Ok(result)
}

/// Convert our Mesh format to csgrs Mesh format
fn mesh_to_csgrs(mesh: &Mesh) -> Result<csgrs::mesh::Mesh<()>> {
    use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};

    let mut polygons = Vec::with_capacity(mesh.triangle_count());

    for tri in mesh.triangles() {
        // Skip degenerate triangles to avoid NaN propagation
        let normal = face_normal(&tri);
        if normal == Vector3::zeros() {
            continue;
        }

        let vertices = tri.iter().map(|p| Vertex::new(*p, normal)).collect();
        polygons.push(Polygon::new(vertices, None));
    }

    if polygons.is_empty() {
        return Err(Error::EmptyMesh(
            "mesh has only degenerate triangles".to_string(),
        ));
    }

    Ok(CSGMesh::from_polygons(&polygons, None))
}

/// Convert csgrs Mesh format back to our Mesh format
///
/// BSP splitting of triangles yields convex planar polygons, so a fan
/// triangulation is sufficient.
fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for polygon in &csg_mesh.polygons {
        let vertices = &polygon.vertices;
        if vertices.len() < 3 {
            continue;
        }

        let points: Vec<Point3<f64>> = vertices
            .iter()
            .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
            .collect();

        let base_idx = mesh.vertex_count() as u32;
        for (v, p) in vertices.iter().zip(points.iter()) {
            let normal = Vector3::new(v.normal[0], v.normal[1], v.normal[2]);
            mesh.add_vertex(*p, normal);
        }

        for k in 1..(points.len() - 1) {
            mesh.add_triangle(base_idx, base_idx + k as u32, base_idx + k as u32 + 1);
        }
    }

    Ok(mesh)
}

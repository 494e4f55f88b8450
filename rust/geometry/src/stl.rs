// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL import/export (binary on write, binary or ASCII on read)

use crate::error::{Error, Result};
use crate::mesh::{face_normal, Mesh};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a mesh as binary STL with per-face normals from triangle winding
pub fn write_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|tri| {
            let n = face_normal(&tri);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.map(|p| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| Error::Stl(e.to_string()))?;

    Ok(())
}

/// Read an STL file into an indexed mesh
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);

    let indexed = stl_io::read_stl(&mut reader).map_err(|e| Error::Stl(e.to_string()))?;

    let mut mesh = Mesh::with_capacity(indexed.faces.len() * 3, indexed.faces.len() * 3);
    for face in &indexed.faces {
        let normal = Vector3::new(
            face.normal[0] as f64,
            face.normal[1] as f64,
            face.normal[2] as f64,
        );
        let base = mesh.vertex_count() as u32;
        for &vi in &face.vertices {
            let v = indexed.vertices[vi];
            mesh.add_vertex(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64), normal);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::box_mesh;

    #[test]
    fn test_write_then_read_preserves_triangles_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("box.stl");

        let mesh = box_mesh(12.0, 8.0, 3.0);
        write_stl(&mesh, &path).unwrap();

        let loaded = read_stl(&path).unwrap();
        assert_eq!(loaded.triangle_count(), mesh.triangle_count());

        let b = loaded.bounds3().unwrap();
        assert!((b.max.x - 12.0).abs() < 1e-4);
        assert!((b.max.y - 8.0).abs() < 1e-4);
        assert!((b.max.z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read_stl("/definitely/not/here.stl").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

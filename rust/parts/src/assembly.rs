// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Side-by-side assembly of component meshes
//!
//! Components are laid out left to right along X. Each one is moved so its
//! bounding box starts at the cursor on X and at zero on Y and Z; the cursor
//! then advances by the component width plus the spacing. Components never
//! overlap along X.

use sketchpart_geometry::stl::read_stl;
use sketchpart_geometry::{Mesh, Vector3};
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_SPACING_MM: f64 = 20.0;

/// Where a component ended up
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub name: String,
    /// Translation applied to the component
    pub offset: Vector3<f64>,
    /// Extent along X after placement
    pub x_range: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub mesh: Mesh,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyComposer {
    pub spacing_mm: f64,
}

impl Default for AssemblyComposer {
    fn default() -> Self {
        Self {
            spacing_mm: DEFAULT_SPACING_MM,
        }
    }
}

impl AssemblyComposer {
    pub fn new(spacing_mm: f64) -> Self {
        Self {
            spacing_mm: spacing_mm.max(0.0),
        }
    }

    /// Lay out named meshes. Empty meshes are skipped; `None` when nothing is left.
    pub fn compose<'m, I, S>(&self, components: I) -> Option<Assembly>
    where
        I: IntoIterator<Item = (S, &'m Mesh)>,
        S: Into<String>,
    {
        let mut combined = Mesh::new();
        let mut placements = Vec::new();
        let mut cursor = 0.0;

        for (name, mesh) in components {
            let name = name.into();
            let Some(bounds) = mesh.bounds3() else {
                warn!(component = %name, "empty component skipped");
                continue;
            };
            let offset = Vector3::new(cursor - bounds.min.x, -bounds.min.y, -bounds.min.z);
            combined.merge(&mesh.translated(offset));

            let width = bounds.size().x;
            debug!(component = %name, x = cursor, width, "component placed");
            placements.push(Placement {
                name,
                offset,
                x_range: (cursor, cursor + width),
            });
            cursor += width + self.spacing_mm;
        }

        if placements.is_empty() {
            return None;
        }
        Some(Assembly {
            mesh: combined,
            placements,
        })
    }

    /// Lay out STL files in order. Unreadable files are skipped.
    pub fn compose_files<P: AsRef<Path>>(&self, paths: &[P]) -> Option<Assembly> {
        let mut loaded = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match read_stl(path) {
                Ok(mesh) => loaded.push((component_name(path), mesh)),
                Err(e) => warn!(path = %path.display(), error = %e, "component skipped"),
            }
        }
        self.compose(loaded.iter().map(|(name, mesh)| (name.clone(), mesh)))
    }
}

fn component_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sketchpart_geometry::primitives::{box_mesh, cylinder};
    use sketchpart_geometry::stl::write_stl;

    #[test]
    fn test_components_do_not_overlap() {
        let a = box_mesh(10.0, 5.0, 5.0).translated(Vector3::new(-50.0, 3.0, 7.0));
        let b = cylinder(6.0, 20.0, 32);
        let c = box_mesh(4.0, 4.0, 4.0);
        let assembly = AssemblyComposer::default()
            .compose([("a", &a), ("b", &b), ("c", &c)])
            .unwrap();

        let ranges: Vec<(f64, f64)> = assembly.placements.iter().map(|p| p.x_range).collect();
        assert_eq!(ranges[0], (0.0, 10.0));
        assert_relative_eq!(ranges[1].0, 30.0);
        assert_relative_eq!(ranges[1].1, 42.0, epsilon = 1e-4);
        assert_relative_eq!(ranges[2].0, 62.0, epsilon = 1e-4);
        for pair in ranges.windows(2) {
            assert!(pair[1].0 >= pair[0].1);
        }

        let b3 = assembly.mesh.bounds3().unwrap();
        assert_relative_eq!(b3.min.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b3.min.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b3.min.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b3.max.x, 66.0, epsilon = 1e-4);
        assert_eq!(
            assembly.mesh.triangle_count(),
            a.triangle_count() + b.triangle_count() + c.triangle_count()
        );
    }

    #[test]
    fn test_empty_input_is_none() {
        let composer = AssemblyComposer::new(5.0);
        assert!(composer.compose(Vec::<(&str, &Mesh)>::new()).is_none());
        let empty = Mesh::new();
        assert!(composer.compose([("nothing", &empty)]).is_none());
    }

    #[test]
    fn test_files_skip_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("block.stl");
        write_stl(&box_mesh(8.0, 8.0, 8.0), &good).unwrap();
        let missing = dir.path().join("missing.stl");

        let assembly = AssemblyComposer::default()
            .compose_files(&[missing, good])
            .unwrap();
        assert_eq!(assembly.placements.len(), 1);
        assert_eq!(assembly.placements[0].name, "block");
        assert_relative_eq!(assembly.mesh.bounds3().unwrap().size().x, 8.0, epsilon = 1e-4);
    }
}

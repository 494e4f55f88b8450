// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plate with holes through extrusion, a counterbore cut and STL

use approx::assert_abs_diff_eq;
use sketchpart_geometry::primitives::cylinder;
use sketchpart_geometry::profile::{circle_contour, rounded_rectangle};
use sketchpart_geometry::stl::{read_stl, write_stl};
use sketchpart_geometry::{extrude_profile, subtract_or_keep, Point2, Profile2D, SynthesisWarning, Vector3};

fn holed_plate() -> Profile2D {
    let outer = rounded_rectangle(80.0, 50.0, 4.0, 6);
    Profile2D::new(outer)
        .with_hole(circle_contour(Point2::new(15.0, 25.0), 3.0, 32))
        .with_hole(circle_contour(Point2::new(65.0, 25.0), 3.0, 32))
}

#[test]
fn plate_survives_stl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.stl");

    let mesh = extrude_profile(&holed_plate(), 6.0, None).unwrap();
    write_stl(&mesh, &path).unwrap();
    let loaded = read_stl(&path).unwrap();

    assert_eq!(loaded.triangle_count(), mesh.triangle_count());
    let b = loaded.bounds3().unwrap();
    assert_abs_diff_eq!(b.size().x, 80.0, epsilon = 1e-3);
    assert_abs_diff_eq!(b.size().y, 50.0, epsilon = 1e-3);
    assert_abs_diff_eq!(b.max.z, 6.0, epsilon = 1e-4);
}

#[test]
fn counterbore_cut_keeps_footprint() {
    let plate = extrude_profile(&holed_plate(), 6.0, None).unwrap();
    let mut bore = cylinder(5.0, 4.0, 32);
    bore.translate(Vector3::new(15.0, 25.0, 3.0));

    let mut warnings: Vec<SynthesisWarning> = Vec::new();
    let cut = subtract_or_keep(&plate, &bore, "counterbore").into_mesh_noting(&mut warnings);
    assert!(warnings.is_empty());

    let b = cut.bounds3().unwrap();
    assert_abs_diff_eq!(b.size().x, 80.0, epsilon = 1e-3);
    assert_abs_diff_eq!(b.size().z, 6.0, epsilon = 1e-3);
}

#[test]
fn zero_depth_is_rejected() {
    assert!(extrude_profile(&holed_plate(), 0.0, None).is_err());
}

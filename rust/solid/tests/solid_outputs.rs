// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde_json::json;
use sketchpart_geometry::stl::read_stl;
use sketchpart_model::PartModel;
use sketchpart_solid::{write_solid, SolidSource};

fn arm_link() -> PartModel {
    serde_json::from_value(json!({
        "part": "Upper Arm",
        "units": "mm",
        "scale": {"px_to_mm": 0.5},
        "material": {"name": "A5052"},
        "process": {"name": "sheet_metal"},
        "geometry": {
            "outline": {"type": "polygon", "points_mm": [[0, 0], [160, 0], [160, 30], [0, 30]]},
            "holes": [
                {"standard": "M6", "diameter_mm": 6.6, "center_mm": [18, 15]},
                {"standard": "M6", "diameter_mm": 6.6, "center_mm": [142, 15]}
            ]
        },
        "constraints": [{"kind": "min_thickness", "value_mm": 6.0}],
        "provenance": {"vision": {"file": "arm.png", "version": "0.1"}}
    }))
    .unwrap()
}

#[test]
fn stl_round_trip_keeps_extent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run").join("model.stl");

    let report = write_solid(&arm_link(), &path).unwrap();
    assert_eq!(report.source, SolidSource::Outline);
    assert!(report.warnings.is_empty());

    let mesh = read_stl(&path).unwrap();
    let b = mesh.bounds3().unwrap();
    assert!((b.size().x - 160.0).abs() < 1e-3);
    assert!((b.size().y - 30.0).abs() < 1e-3);
    // Plate 6 mm plus bosses max(2, 2.4)
    assert!((b.max.z - 8.4).abs() < 1e-3);
}

#[test]
fn thickness_defaults_to_five_without_constraint() {
    let mut model = arm_link();
    model.part = "cover".into();
    model.constraints.clear();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.stl");
    write_solid(&model, &path).unwrap();
    let mesh = read_stl(&path).unwrap();
    assert!((mesh.bounds3().unwrap().max.z - 5.0).abs() < 1e-3);
}

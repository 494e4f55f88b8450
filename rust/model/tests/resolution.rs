// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde_json::json;
use sketchpart_model::{ModelAssembler, ParameterMap, PartModel, PartModelPatch};
use sketchpart_vision::CanonicalFeatureSet;

fn features() -> CanonicalFeatureSet {
    serde_json::from_value(json!({
        "outline": {"points_px": [[0, 0], [200, 0], [200, 120], [0, 120]]},
        "holes": [
            {"center_px": [50, 60], "radius_px": 10},
            {"center_px": [150, 60], "radius_px": 10.4}
        ],
        "bend_lines": []
    }))
    .unwrap()
}

#[test]
fn every_coordinate_is_scaled_by_the_resolved_factor() {
    let params = ParameterMap::new().with("plate_width_mm", 100);
    let resolution = ModelAssembler.assemble(&features(), &params, "plate.png");
    let model = &resolution.model;

    assert_eq!(model.scale.px_to_mm, 0.5);
    let source = features();
    for (px, mm) in source
        .outline()
        .points
        .iter()
        .zip(&model.geometry.outline.points_mm)
    {
        assert_eq!(mm.x, px.x * 0.5);
        assert_eq!(mm.y, px.y * 0.5);
    }
    for (px, mm) in source.holes().iter().zip(&model.geometry.holes) {
        assert_eq!(mm.center_mm.x, px.center.x * 0.5);
        assert_eq!(mm.center_mm.y, px.center.y * 0.5);
    }
}

#[test]
fn patched_snapshot_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run").join("part_model.json");

    let params = ParameterMap::new()
        .with("px_to_mm", 0.5)
        .with("thickness_mm", 3)
        .with("hole_standard", "M5");
    let model = ModelAssembler.assemble(&features(), &params, "plate.png").model;
    model.save(&path).unwrap();

    let patch = PartModelPatch::from_value(&json!({"intent": {"summary": "sensor mount"}})).unwrap();
    let loaded = PartModel::load(&path).unwrap();
    let next = loaded.apply_patch(&patch);
    next.save(&path).unwrap();

    let reloaded = PartModel::load(&path).unwrap();
    assert_eq!(reloaded.intent["summary"], "sensor mount");
    assert_eq!(reloaded.geometry, model.geometry);
    assert_eq!(reloaded.provenance, model.provenance);
}

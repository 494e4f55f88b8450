// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use serde_json::json;
use sketchpart_geometry::stl::{read_stl, write_stl};
use sketchpart_model::ParameterMap;
use sketchpart_parts::{generate_assembly, generate_part, AssemblyComposer, PartCatalog, PartRequest};

#[test]
fn every_catalog_part_builds_with_defaults() {
    let catalog = PartCatalog::standard();
    for part in catalog.all_parts() {
        let generated = generate_part(&catalog, &part.id, &ParameterMap::new(), 1.0)
            .unwrap_or_else(|e| panic!("{}: {e}", part.id));
        assert!(!generated.mesh.is_empty(), "{} is empty", part.id);
        let b = generated.bounds.unwrap();
        assert!(b.size().x > 0.0 && b.size().y > 0.0 && b.size().z > 0.0, "{} is flat", part.id);
    }
}

#[test]
fn m5_hex_bolt_dimensions() {
    let catalog = PartCatalog::standard();
    let params = ParameterMap::from_value(json!({"size": "M5", "length_mm": 20, "head_type": "hex"}));
    let bolt = generate_part(&catalog, "bolt", &params, 1.0).unwrap();
    let b = bolt.bounds.unwrap();
    // Head 8.5 mm across flats, 3.5 mm tall, on a 20 mm shank
    assert_relative_eq!(b.size().x, 8.5, epsilon = 1e-3);
    assert_relative_eq!(b.size().z, 23.5, epsilon = 1e-3);
}

#[test]
fn spur_gear_outer_diameter() {
    let catalog = PartCatalog::standard();
    let params = ParameterMap::from_value(json!({"module": 2, "teeth_count": 20}));
    let gear = generate_part(&catalog, "spur_gear", &params, 1.0).unwrap();
    let b = gear.bounds.unwrap();
    // Tip circle is m * (z + 2)
    assert!(b.size().x <= 44.0 + 1e-3);
    assert!(b.size().x > 40.0);
}

#[test]
fn assembly_written_and_reloaded_without_overlap() {
    let catalog = PartCatalog::standard();
    let requests = vec![
        PartRequest::new("plate", ParameterMap::new()),
        PartRequest::new("nut", ParameterMap::new().with("size", "M6")).with_quantity(2),
        PartRequest::new("shaft", ParameterMap::new().with("length_mm", 40)),
    ];
    let output = generate_assembly(&catalog, &requests, 1.0);
    assert_eq!(output.instances.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for instance in &output.instances {
        let path = dir.path().join(format!("{}.stl", instance.label()));
        write_stl(&instance.mesh, &path).unwrap();
        paths.push(path);
    }

    let assembly = AssemblyComposer::default().compose_files(&paths).unwrap();
    assert_eq!(assembly.placements.len(), 4);
    for pair in assembly.placements.windows(2) {
        assert!(pair[1].x_range.0 >= pair[0].x_range.1 + 19.999);
    }

    let combined = dir.path().join("assembly.stl");
    write_stl(&assembly.mesh, &combined).unwrap();
    let reloaded = read_stl(&combined).unwrap();
    assert_eq!(reloaded.triangle_count(), assembly.mesh.triangle_count());
}

#[test]
fn scaled_generation_doubles_length_parameters() {
    let catalog = PartCatalog::standard();
    let base = generate_part(&catalog, "bearing", &ParameterMap::new(), 1.0).unwrap();
    let doubled = generate_part(&catalog, "bearing", &ParameterMap::new(), 2.0).unwrap();
    let (b1, b2) = (base.bounds.unwrap(), doubled.bounds.unwrap());
    assert_relative_eq!(b2.size().x, b1.size().x * 2.0, epsilon = 1e-3);
    assert_relative_eq!(b2.size().z, b1.size().z * 2.0, epsilon = 1e-3);
}

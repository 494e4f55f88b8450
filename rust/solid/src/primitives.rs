// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named primitives used when a part has no usable outline

use crate::classify::PrimitiveKind;
use crate::dims::PrimitiveDims;
use crate::features::{add_rings, BOSS, COLLAR, STANDOFF};
use sketchpart_geometry::extrusion::extrude_profile;
use sketchpart_geometry::primitives::{box_mesh, cylinder, tube};
use sketchpart_geometry::profile::{circle_contour, rounded_rectangle, translate_contour};
use sketchpart_geometry::{
    subtract_or_keep, Mesh, Point2, Profile2D, Result, SynthesisWarning, Vector3,
};
use std::f64::consts::PI;

const GEAR_TEETH: usize = 24;
const GEAR_ROOT_RATIO: f64 = 0.85;

/// Build the primitive for `kind`; failed cuts are pushed to `warnings`
pub fn build_primitive(
    kind: PrimitiveKind,
    dims: &PrimitiveDims,
    thickness: f64,
    warnings: &mut Vec<SynthesisWarning>,
) -> Result<Mesh> {
    let s = dims.scale;
    match kind {
        PrimitiveKind::Link => link(dims, thickness),
        PrimitiveKind::Joint => joint(dims, thickness),
        PrimitiveKind::Base => base(dims, thickness),
        PrimitiveKind::EndEffector => Ok(box_mesh(50.0 * s, 30.0 * s, thickness)),
        PrimitiveKind::Shaft => Ok(shaft(dims, warnings)),
        PrimitiveKind::Motor => Ok(cylinder(
            dims.motor_outer_diameter_mm / 2.0,
            dims.motor_length_mm,
            64,
        )),
        PrimitiveKind::Housing => Ok(housing(dims, thickness)),
        PrimitiveKind::MotorMount => motor_mount(dims, thickness),
        PrimitiveKind::Bearing => {
            let profile = Profile2D::new(circle_contour(
                Point2::origin(),
                dims.bearing_outer_diameter_mm / 2.0,
                96,
            ))
            .with_hole(circle_contour(
                Point2::origin(),
                dims.bearing_inner_diameter_mm / 2.0,
                64,
            ));
            extrude_profile(&profile, thickness, None)
        }
        PrimitiveKind::Spacer => {
            let profile = Profile2D::new(circle_contour(Point2::origin(), 15.0 * s, 64))
                .with_hole(circle_contour(Point2::origin(), dims.shaft_diameter_mm / 2.0, 48));
            extrude_profile(&profile, thickness, None)
        }
        PrimitiveKind::Bracket => {
            let outline = [(0.0, 0.0), (60.0, 0.0), (60.0, 15.0), (20.0, 15.0), (20.0, 50.0), (0.0, 50.0)]
                .iter()
                .map(|(x, y)| Point2::new(x * s, y * s))
                .collect();
            let mut profile = Profile2D::new(outline);
            for (x, y) in [(10.0, 10.0), (10.0, 40.0)] {
                profile.add_hole(circle_contour(Point2::new(x * s, y * s), 3.0 * s, 36));
            }
            extrude_profile(&profile, thickness, None)
        }
        PrimitiveKind::Gear => {
            let mut profile = Profile2D::new(gear_outline(dims.gear_outer_diameter_mm, GEAR_TEETH));
            let bore = dims.gear_bore_diameter_mm / 2.0;
            if bore < dims.gear_outer_diameter_mm / 2.0 * GEAR_ROOT_RATIO {
                profile.add_hole(circle_contour(Point2::origin(), bore, 48));
            }
            extrude_profile(&profile, thickness, None)
                .or_else(|_| Ok(cylinder(dims.gear_outer_diameter_mm / 2.0, thickness, 96)))
        }
    }
}

/// Generic flat box for names no primitive matches
pub fn fallback_box(scale: f64, thickness: f64) -> Mesh {
    box_mesh(60.0 * scale, 40.0 * scale, thickness)
}

/// Star polygon alternating tip and root radius, two points per tooth
pub fn gear_outline(outer_diameter: f64, teeth: usize) -> Vec<Point2<f64>> {
    let teeth = teeth.max(8);
    let outer = outer_diameter / 2.0;
    let root = outer * GEAR_ROOT_RATIO;
    let total = teeth * 2;
    (0..total)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / total as f64;
            let r = if i % 2 == 0 { outer } else { root };
            Point2::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// Rounded rectangle with its lower-left corner at the origin
fn corner_rect(width: f64, height: f64, fillet: f64) -> Vec<Point2<f64>> {
    translate_contour(&rounded_rectangle(width, height, fillet, 10), width / 2.0, height / 2.0)
}

fn plate_with_holes(
    outline: Vec<Point2<f64>>,
    holes: &[(Point2<f64>, f64)],
    segments: usize,
    thickness: f64,
) -> Result<Mesh> {
    let mut profile = Profile2D::new(outline);
    for (center, radius) in holes {
        profile.add_hole(circle_contour(*center, *radius, segments));
    }
    extrude_profile(&profile, thickness, None)
}

fn link(dims: &PrimitiveDims, thickness: f64) -> Result<Mesh> {
    let (length, width, offset) = (dims.link_length_mm, dims.link_width_mm, dims.link_hole_offset_mm);
    let fillet = (6.0 * dims.scale).min(width / 2.0);
    let hole_r = dims.joint_hole_diameter_mm / 2.0;
    let holes = [
        (Point2::new(offset, width / 2.0), hole_r),
        (Point2::new(length - offset, width / 2.0), hole_r),
    ];
    let mut mesh = plate_with_holes(corner_rect(length, width, fillet), &holes, 48, thickness)?;
    add_rings(&mut mesh, &BOSS, &holes, thickness);
    Ok(mesh)
}

fn joint(dims: &PrimitiveDims, thickness: f64) -> Result<Mesh> {
    let shaft_r = dims.joint_hole_diameter_mm / 2.0;
    let outline = circle_contour(Point2::origin(), dims.joint_outer_diameter_mm / 2.0, 80);
    let holes = [(Point2::origin(), shaft_r)];
    let mut mesh = plate_with_holes(outline, &holes, 48, thickness)?;
    add_rings(&mut mesh, &COLLAR, &holes, thickness);
    Ok(mesh)
}

fn base(dims: &PrimitiveDims, thickness: f64) -> Result<Mesh> {
    let (w, h) = (dims.base_width_mm, dims.base_height_mm);
    let fillet = (8.0 * dims.scale).min(w / 2.0).min(h / 2.0);
    let hole_r = dims.joint_hole_diameter_mm / 2.0;
    let offset = (14.0 * dims.scale).min(w / 4.0).min(h / 4.0);
    let holes: Vec<_> = [(offset, offset), (w - offset, offset), (w - offset, h - offset), (offset, h - offset)]
        .into_iter()
        .map(|(x, y)| (Point2::new(x, y), hole_r))
        .collect();
    let mut mesh = plate_with_holes(corner_rect(w, h, fillet), &holes, 36, thickness)?;
    add_rings(&mut mesh, &STANDOFF, &holes, thickness);
    Ok(mesh)
}

fn motor_mount(dims: &PrimitiveDims, thickness: f64) -> Result<Mesh> {
    let s = dims.scale;
    let (w, h) = (dims.motor_mount_width_mm, dims.motor_mount_height_mm);
    let inset = 12.0 * s;
    let mut holes: Vec<_> = [(inset, inset), (w - inset, inset), (w - inset, h - inset), (inset, h - inset)]
        .into_iter()
        .map(|(x, y)| (Point2::new(x, y), 3.0 * s))
        .collect();
    holes.push((Point2::new(w / 2.0, h / 2.0), 6.0 * s));
    plate_with_holes(corner_rect(w, h, 6.0 * s), &holes, 36, thickness)
}

/// Shaft along Z with a keyway pocket on +X
fn shaft(dims: &PrimitiveDims, warnings: &mut Vec<SynthesisWarning>) -> Mesh {
    let r = dims.shaft_diameter_mm / 2.0;
    let length = dims.shaft_length_mm;
    let body = cylinder(r, length, 48);

    let key_width = dims.shaft_diameter_mm * 0.25;
    let key_depth = dims.shaft_diameter_mm * 0.125;
    let mut tool = box_mesh(key_depth + 1.0, key_width, length * 0.6);
    tool.translate(Vector3::new(r - key_depth, -key_width / 2.0, length * 0.2));
    subtract_or_keep(&body, &tool, "keyway").into_mesh_noting(warnings)
}

/// Closed-bottom can around a motor body
fn housing(dims: &PrimitiveDims, thickness: f64) -> Mesh {
    let inner = dims.motor_outer_diameter_mm / 2.0;
    let outer = inner + (4.0 * dims.scale).max(thickness / 2.0);
    let mut mesh = cylinder(outer, thickness, 64);
    let mut wall = tube(outer, inner, dims.motor_length_mm, 64);
    wall.translate(Vector3::new(0.0, 0.0, thickness));
    mesh.merge(&wall);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn build(kind: PrimitiveKind, dims: &PrimitiveDims, t: f64) -> (Mesh, Vec<SynthesisWarning>) {
        let mut warnings = Vec::new();
        let mesh = build_primitive(kind, dims, t, &mut warnings).unwrap();
        (mesh, warnings)
    }

    #[test]
    fn test_every_kind_builds() {
        let dims = PrimitiveDims::default();
        for kind in PrimitiveKind::ALL {
            let (mesh, _) = build(kind, &dims, 5.0);
            assert!(!mesh.is_empty(), "{kind} produced nothing");
        }
    }

    #[test]
    fn test_link_extent_and_bosses() {
        let dims = PrimitiveDims::default();
        let (mesh, warnings) = build(PrimitiveKind::Link, &dims, 5.0);
        assert!(warnings.is_empty());
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 160.0, epsilon = 1e-6);
        assert_relative_eq!(b.size().y, 30.0, epsilon = 1e-6);
        // Boss height max(2, 0.4 * 5) on top of the plate
        assert_relative_eq!(b.max.z, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_base_standoffs_and_joint_collar() {
        let dims = PrimitiveDims::from_overrides(0.6, None);
        let (base, _) = build(PrimitiveKind::Base, &dims, 10.0);
        let b = base.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 72.0, epsilon = 1e-6);
        assert_relative_eq!(b.max.z, 16.0, epsilon = 1e-6);

        let (joint, _) = build(PrimitiveKind::Joint, &dims, 4.0);
        assert_relative_eq!(joint.bounds3().unwrap().max.z, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shaft_keeps_envelope() {
        let dims = PrimitiveDims::default();
        let (mesh, _) = build(PrimitiveKind::Shaft, &dims, 5.0);
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().z, 80.0, epsilon = 1e-4);
        assert_relative_eq!(b.min.x, -6.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gear_outline_alternates() {
        let pts = gear_outline(60.0, 24);
        assert_eq!(pts.len(), 48);
        assert_relative_eq!(pts[0].coords.norm(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(pts[1].coords.norm(), 25.5, epsilon = 1e-9);
        assert_eq!(gear_outline(60.0, 3).len(), 16);
    }

    #[test]
    fn test_fallback_box_scales() {
        let b = fallback_box(1.4, 5.0).bounds3().unwrap();
        assert_relative_eq!(b.size().x, 84.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().y, 56.0, epsilon = 1e-9);
    }
}

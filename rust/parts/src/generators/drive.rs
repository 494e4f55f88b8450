// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Motors, shafts, bearings and couplings
//!
//! All drive parts are built around the Z axis with their base on z = 0.

use super::{combine, disc, extrude, Args, GeneratorRegistry};
use crate::catalog::GeneratorBinding;
use crate::error::{GeneratorError, GeneratorResult};
use sketchpart_geometry::primitives::{box_centered, box_mesh, cylinder, rotate_z, tube};
use sketchpart_geometry::profile::circle_contour;
use sketchpart_geometry::{subtract_or_keep, Mesh, Point2, Point3, SynthesisWarning, Vector3};
use sketchpart_model::ParameterMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::debug;

const ROUND_SEGMENTS: usize = 64;
const SMALL_SEGMENTS: usize = 32;

/// Share of a jaw coupling's length taken by the solid base
const JAW_BASE_FRACTION: f64 = 0.3;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register(GeneratorBinding::new("drive", "motor"), motor);
    registry.register(GeneratorBinding::new("drive", "shaft"), shaft);
    registry.register(GeneratorBinding::new("drive", "bearing"), bearing);
    registry.register(GeneratorBinding::new("drive", "coupling"), coupling);
}

/// Stepper-style motor: body, square-ish mounting flange with holes on a
/// pitch circle, output shaft on top
pub fn motor(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let body_d = args.positive("body_diameter_mm", 42.0)?;
    let body_len = args.positive("body_length_mm", 40.0)?;
    let shaft_d = args.non_negative("shaft_diameter_mm", 5.0);
    let shaft_len = args.non_negative("shaft_length_mm", 20.0);
    let flange_d = args.non_negative("flange_diameter_mm", 50.0);
    let flange_t = args.non_negative("flange_thickness_mm", 3.0);
    let hole_r = args.non_negative("mounting_hole_diameter_mm", 3.0) / 2.0;
    let pcd = args.non_negative("mounting_hole_pcd_mm", 31.0);
    let hole_count = args.count("mounting_holes_count", 4);

    let mut parts = vec![cylinder(body_d / 2.0, body_len, ROUND_SEGMENTS)];

    if flange_d > 0.0 && flange_t > 0.0 {
        let mut profile = disc(flange_d / 2.0, 0.0, ROUND_SEGMENTS);
        if hole_r > 0.0 {
            for i in 0..hole_count {
                let angle = 2.0 * PI * i as f64 / hole_count as f64 + FRAC_PI_4;
                let center = Point2::new(pcd / 2.0 * angle.cos(), pcd / 2.0 * angle.sin());
                profile.add_hole(circle_contour(center, hole_r, SMALL_SEGMENTS));
            }
        }
        parts.push(extrude(&profile, body_len, flange_t)?);
    }

    if shaft_d > 0.0 && shaft_len > 0.0 {
        let mut output = cylinder(shaft_d / 2.0, shaft_len, SMALL_SEGMENTS);
        output.translate(Vector3::new(0.0, 0.0, body_len + flange_t));
        parts.push(output);
    }
    combine(parts)
}

/// Round shaft, optionally with a keyway milled into the top end
pub fn shaft(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let diameter = args.positive("diameter_mm", 8.0)?;
    let length = args.positive("length_mm", 100.0)?;
    let keyway = args.flag("keyway", false);

    let body = cylinder(diameter / 2.0, length, ROUND_SEGMENTS);
    if !keyway {
        return Ok(body);
    }

    let key_w = args.positive("keyway_width_mm", 3.0)?;
    let key_d = args.positive("keyway_depth_mm", 1.5)?;
    let key_len = args.positive("keyway_length_mm", 20.0)?.min(length);
    if key_w >= diameter || key_d >= diameter / 2.0 {
        return Err(GeneratorError::invalid(
            "keyway_width_mm",
            format!("keyway {key_w} x {key_d} does not fit a {diameter} shaft"),
        ));
    }

    // Tool pokes past the surface and the end face so the cut is clean
    let overshoot = 1.0;
    let mut tool = box_mesh(key_w, key_d + overshoot, key_len + overshoot);
    tool.translate(Vector3::new(-key_w / 2.0, diameter / 2.0 - key_d, length - key_len));
    debug!(key_w, key_d, key_len, "cutting keyway");
    Ok(subtract_or_keep(&body, &tool, "keyway").into_mesh_noting(warnings))
}

/// Ball bearing envelope: a plain ring
///
/// `chamfer_mm` is accepted in the catalog but the edges stay square.
pub fn bearing(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let outer = args.positive("outer_diameter_mm", 22.0)?;
    let inner = args.non_negative("inner_diameter_mm", 8.0);
    let width = args.positive("width_mm", 7.0)?;
    if inner >= outer {
        return Err(GeneratorError::invalid(
            "inner_diameter_mm",
            format!("bore {inner} is not smaller than outer diameter {outer}"),
        ));
    }
    Ok(tube(outer / 2.0, inner / 2.0, width, ROUND_SEGMENTS))
}

/// Coupling style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingKind {
    Rigid,
    Jaw,
}

impl CouplingKind {
    /// `jaw` and `spider` share a geometry; anything else is rigid
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "jaw" | "spider" => CouplingKind::Jaw,
            _ => CouplingKind::Rigid,
        }
    }
}

pub fn coupling(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let outer_d = args.positive("outer_diameter_mm", 25.0)?;
    let bore_d = args.non_negative("bore_diameter_mm", 8.0);
    let length = args.positive("length_mm", 30.0)?;
    let kind = CouplingKind::parse(args.text("coupling_type", "rigid"));

    if kind == CouplingKind::Rigid {
        return Ok(tube(outer_d / 2.0, bore_d / 2.0, length, ROUND_SEGMENTS));
    }

    let jaw_count = args.count("jaw_count", 3).max(1);
    let base_h = length * JAW_BASE_FRACTION;
    let jaw_h = length - base_h;
    let jaw_r = outer_d / 2.0 * 0.85;
    let jaw_w = 2.0 * PI * jaw_r / (2 * jaw_count) as f64 * 0.8;

    let mut parts = vec![tube(outer_d / 2.0, bore_d / 2.0, base_h, ROUND_SEGMENTS)];
    for i in 0..jaw_count {
        let theta = 2.0 * PI * i as f64 / jaw_count as f64;
        // Oriented at the origin, then moved out to the jaw circle
        let mut jaw = box_centered(Point3::origin(), Vector3::new(jaw_w, outer_d * 0.3, jaw_h));
        rotate_z(&mut jaw, theta - FRAC_PI_2);
        jaw.translate(Vector3::new(
            jaw_r * theta.cos(),
            jaw_r * theta.sin(),
            base_h + jaw_h / 2.0,
        ));
        parts.push(jaw);
    }
    combine(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ParameterMap {
        ParameterMap::from_value(value)
    }

    #[test]
    fn test_motor_stack_height() {
        let mesh = motor(&params(json!({})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.min.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.z, 63.0, epsilon = 1e-4);
        // Flange is the widest part
        assert_relative_eq!(b.size().x, 50.0, epsilon = 0.1);
    }

    #[test]
    fn test_motor_without_shaft() {
        let mesh = motor(&params(json!({"shaft_length_mm": 0})), &mut Vec::new()).unwrap();
        assert_relative_eq!(mesh.bounds3().unwrap().max.z, 43.0, epsilon = 1e-4);
    }

    #[test]
    fn test_plain_shaft() {
        let mesh = shaft(&params(json!({"diameter_mm": 10, "length_mm": 50})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 10.0, epsilon = 1e-3);
        assert_relative_eq!(b.size().z, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn test_keyway_never_grows_the_shaft() {
        let mut warnings = Vec::new();
        let mesh = shaft(&params(json!({"keyway": true})), &mut warnings).unwrap();
        let b = mesh.bounds3().unwrap();
        // Cut or uncut, the result stays inside the plain cylinder
        assert!(b.max.z <= 100.0 + 1e-4);
        assert!(b.max.y <= 4.0 + 1e-3);
        assert!(warnings.len() <= 1);
    }

    #[test]
    fn test_oversized_keyway_rejected() {
        let err = shaft(&params(json!({"keyway": true, "keyway_width_mm": 9})), &mut Vec::new());
        assert!(err.is_err());
    }

    #[test]
    fn test_bearing_dimensions() {
        let mesh = bearing(&params(json!({})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 22.0, epsilon = 1e-3);
        assert_relative_eq!(b.size().z, 7.0, epsilon = 1e-4);
        assert!(bearing(&params(json!({"inner_diameter_mm": 30})), &mut Vec::new()).is_err());
    }

    #[test]
    fn test_bearing_chamfer_keeps_square_edges() {
        let mut warnings = Vec::new();
        let plain = bearing(&params(json!({})), &mut warnings).unwrap();
        let chamfered = bearing(&params(json!({"chamfer_mm": 0.5})), &mut warnings).unwrap();
        assert_eq!(chamfered.triangle_count(), plain.triangle_count());
        assert_eq!(chamfered.positions, plain.positions);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_coupling_kinds() {
        assert_eq!(CouplingKind::parse("Spider"), CouplingKind::Jaw);
        assert_eq!(CouplingKind::parse("oldham"), CouplingKind::Rigid);

        let rigid = coupling(&params(json!({})), &mut Vec::new()).unwrap();
        assert_relative_eq!(rigid.bounds3().unwrap().size().z, 30.0, epsilon = 1e-4);

        let jaw = coupling(&params(json!({"coupling_type": "jaw"})), &mut Vec::new()).unwrap();
        let b = jaw.bounds3().unwrap();
        assert_relative_eq!(b.min.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.z, 30.0, epsilon = 1e-4);
        assert!(jaw.triangle_count() > rigid.triangle_count() / 2);
    }
}

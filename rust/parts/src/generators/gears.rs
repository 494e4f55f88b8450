// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gears: spur, helical, bevel and rack
//!
//! Tooth forms are polygonal approximations sized from the module; they are
//! good for fit checks and printing prototypes, not for meshing analysis.

use super::{combine, disc, extrude, Args, GeneratorRegistry};
use crate::catalog::GeneratorBinding;
use crate::error::{GeneratorError, GeneratorResult};
use sketchpart_geometry::primitives::tube;
use sketchpart_geometry::profile::circle_contour;
use sketchpart_geometry::{Mesh, Point2, Profile2D, SynthesisWarning, Vector3};
use sketchpart_model::ParameterMap;
use std::f64::consts::PI;
use tracing::debug;

pub const POINTS_PER_TOOTH: usize = 8;
const BEVEL_SECTIONS: usize = 8;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register(GeneratorBinding::new("gears", "spur_gear"), spur_gear);
    registry.register(GeneratorBinding::new("gears", "helical_gear"), helical_gear);
    registry.register(GeneratorBinding::new("gears", "bevel_gear"), bevel_gear);
    registry.register(GeneratorBinding::new("gears", "rack"), rack);
}

/// Radii of a gear sized by module and tooth count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearRadii {
    pub pitch: f64,
    pub outer: f64,
    pub root: f64,
}

impl GearRadii {
    pub fn new(module: f64, teeth: usize) -> Self {
        let pitch = module * teeth as f64 / 2.0;
        Self {
            pitch,
            outer: pitch + module,
            root: (pitch - 1.25 * module).max(module),
        }
    }
}

/// Closed gear outline, [`POINTS_PER_TOOTH`] points per tooth, counter-clockwise.
///
/// Each tooth climbs from the root through the pitch flank to the tip and
/// back down; the last point sits on the root circle halfway to the next tooth.
pub fn tooth_profile(module: f64, teeth: usize) -> Vec<Point2<f64>> {
    let radii = GearRadii::new(module, teeth);
    let pitch_angle = 2.0 * PI / teeth as f64;
    let half = pitch_angle * 0.25;
    let stations = [
        (-1.4 * half, radii.root),
        (-0.8 * half, radii.pitch * 0.95),
        (-0.3 * half, radii.outer * 0.98),
        (0.0, radii.outer),
        (0.3 * half, radii.outer * 0.98),
        (0.8 * half, radii.pitch * 0.95),
        (1.4 * half, radii.root),
        (2.0 * half, radii.root),
    ];

    let mut points = Vec::with_capacity(teeth * POINTS_PER_TOOTH);
    for i in 0..teeth {
        let base = i as f64 * pitch_angle;
        for (offset, radius) in stations {
            let angle = base + offset;
            points.push(Point2::new(radius * angle.cos(), radius * angle.sin()));
        }
    }
    points
}

struct GearBody {
    module: f64,
    teeth: usize,
    face_width: f64,
    bore_diameter: f64,
    hub_diameter: f64,
    hub_length: f64,
}

impl GearBody {
    fn read(args: &Args, face_default: f64) -> GeneratorResult<Self> {
        let teeth = args.count("teeth_count", 24);
        if teeth < 3 {
            return Err(GeneratorError::invalid("teeth_count", format!("need at least 3 teeth, got {teeth}")));
        }
        Ok(Self {
            module: args.positive("module", 1.0)?,
            teeth,
            face_width: args.positive("face_width_mm", face_default)?,
            bore_diameter: args.non_negative("bore_diameter_mm", 8.0),
            hub_diameter: args.non_negative("hub_diameter_mm", 0.0),
            hub_length: args.non_negative("hub_length_mm", 0.0),
        })
    }

    fn build(&self, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
        let radii = GearRadii::new(self.module, self.teeth);
        let bore_r = self.bore_diameter / 2.0;

        let body = if bore_r < radii.root {
            let mut profile = Profile2D::new(tooth_profile(self.module, self.teeth));
            if bore_r > 0.0 {
                profile.add_hole(circle_contour(Point2::origin(), bore_r, 64));
            }
            extrude(&profile, 0.0, self.face_width)
        } else {
            Err(GeneratorError::invalid(
                "bore_diameter_mm",
                "bore reaches the tooth roots",
            ))
        };

        let body = match body {
            Ok(mesh) => mesh,
            Err(e) => {
                // Plain disc of the outside diameter
                warnings.push(SynthesisWarning::PrimitiveSubstituted {
                    kind: format!("toothless disc ({e})"),
                });
                tube(radii.outer, bore_r, self.face_width, 96)
            }
        };

        let mut parts = vec![body];
        if self.hub_diameter > 0.0 && self.hub_length > 0.0 {
            let hub = disc(self.hub_diameter / 2.0, bore_r, 64);
            parts.push(extrude(&hub, self.face_width, self.hub_length)?);
        }
        combine(parts)
    }
}

pub fn spur_gear(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    GearBody::read(&Args(params), 10.0)?.build(warnings)
}

/// Helical gears are built with the straight spur profile
pub fn helical_gear(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let helix_angle_deg = args.f64("helix_angle_deg", 15.0);
    let hand = args.text("hand", "right");
    debug!(helix_angle_deg, hand, "helical gear built with a straight profile");

    let mut body = GearBody::read(&args, 15.0)?;
    // No hub on helical gears
    body.hub_diameter = 0.0;
    body.build(warnings)
}

/// Bevel gear as a stack of cylindrical sections tapering toward the apex
pub fn bevel_gear(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let module = args.positive("module", 1.5)?;
    let teeth = args.count("teeth_count", 20).max(1);
    let cone_angle_deg = args.f64("cone_angle_deg", 45.0);
    let face_width = args.positive("face_width_mm", 12.0)?;
    let bore_r = args.non_negative("bore_diameter_mm", 10.0) / 2.0;
    if !(cone_angle_deg > 0.0 && cone_angle_deg < 90.0) {
        return Err(GeneratorError::invalid(
            "cone_angle_deg",
            format!("must lie strictly between 0 and 90, got {cone_angle_deg}"),
        ));
    }

    let outer = GearRadii::new(module, teeth).outer;
    let top = (outer - face_width * cone_angle_deg.to_radians().tan()).max(bore_r + 2.0);
    let section_height = face_width / BEVEL_SECTIONS as f64;

    let sections = (0..BEVEL_SECTIONS)
        .map(|i| {
            let t0 = i as f64 / BEVEL_SECTIONS as f64;
            let t1 = (i + 1) as f64 / BEVEL_SECTIONS as f64;
            let r0 = outer - (outer - top) * t0;
            let r1 = outer - (outer - top) * t1;
            let mut section = tube((r0 + r1) / 2.0, bore_r, section_height, 64);
            section.translate(Vector3::new(0.0, 0.0, section_height * i as f64));
            section
        })
        .collect();
    combine(sections)
}

/// Straight rack: a bar with trapezoidal teeth on its top edge
pub fn rack(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let module = args.positive("module", 1.5)?;
    let teeth = args.count("teeth_count", 20);
    let face_width = args.positive("face_width_mm", 15.0)?;
    let height = args.positive("height_mm", 20.0)?;
    let mounting_holes = args.flag("mounting_holes", true);
    let hole_r = args.non_negative("hole_diameter_mm", 5.0) / 2.0;
    if teeth == 0 {
        return Err(GeneratorError::invalid("teeth_count", "need at least one tooth"));
    }

    let pitch = PI * module;
    let length = pitch * teeth as f64;
    let tooth_height = 2.25 * module;
    let base = height - tooth_height;
    if base <= 0.0 {
        return Err(GeneratorError::invalid(
            "height_mm",
            format!("{height} leaves no bar under {tooth_height} mm teeth"),
        ));
    }

    // Counter-clockwise: along the bottom, up the right end, teeth right to left
    let q = pitch / 4.0;
    let mut outline = vec![
        Point2::new(0.0, 0.0),
        Point2::new(length, 0.0),
        Point2::new(length, base),
    ];
    for i in (0..teeth).rev() {
        let xc = pitch * (i as f64 + 0.5);
        outline.push(Point2::new(xc + 1.3 * q, base));
        outline.push(Point2::new(xc + 0.5 * q, base + tooth_height));
        outline.push(Point2::new(xc - 0.5 * q, base + tooth_height));
        outline.push(Point2::new(xc - 1.3 * q, base));
    }
    outline.push(Point2::new(0.0, base));

    let mut profile = Profile2D::new(outline);
    let hole_count = teeth / 5;
    if mounting_holes && hole_r > 0.0 && hole_count > 0 {
        if hole_r < base / 2.0 {
            let spacing = length / (hole_count + 1) as f64;
            for i in 1..=hole_count {
                profile.add_hole(circle_contour(Point2::new(spacing * i as f64, base / 2.0), hole_r, 32));
            }
        } else {
            warnings.push(SynthesisWarning::parameter(
                "mounting holes do not fit under the teeth and were left out",
            ));
        }
    }

    extrude(&profile, 0.0, face_width)
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
    fn test_profile_has_eight_points_per_tooth_within_radii() {
        let points = tooth_profile(1.0, 24);
        assert_eq!(points.len(), 24 * POINTS_PER_TOOTH);
        let radii = GearRadii::new(1.0, 24);
        assert_relative_eq!(radii.pitch, 12.0);
        assert_relative_eq!(radii.outer, 13.0);
        assert_relative_eq!(radii.root, 10.75);
        let max_r = points.iter().map(|p| p.coords.norm()).fold(0.0, f64::max);
        let min_r = points.iter().map(|p| p.coords.norm()).fold(f64::MAX, f64::min);
        assert_relative_eq!(max_r, 13.0, epsilon = 1e-9);
        assert_relative_eq!(min_r, 10.75, epsilon = 1e-9);
        assert!(sketchpart_geometry::bool2d::compute_signed_area(&points) > 0.0);
        assert!(!sketchpart_geometry::bool2d::is_self_intersecting(&points));
    }

    #[test]
    fn test_small_gear_root_floor() {
        let radii = GearRadii::new(2.0, 3);
        assert_relative_eq!(radii.root, 2.0);
    }

    #[test]
    fn test_spur_gear_with_hub() {
        let mut warnings = Vec::new();
        let mesh = spur_gear(
            &params(json!({"module": 2.0, "teeth_count": 20, "face_width_mm": 8.0,
                           "bore_diameter_mm": 6.0, "hub_diameter_mm": 16.0, "hub_length_mm": 5.0})),
            &mut warnings,
        )
        .unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.z, 13.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.x, 22.0, epsilon = 1e-4);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_oversized_bore_degrades_to_disc() {
        let mut warnings = Vec::new();
        let mesh = spur_gear(&params(json!({"bore_diameter_mm": 30.0})), &mut warnings).unwrap();
        assert!(!mesh.is_empty());
        assert!(matches!(warnings[0], SynthesisWarning::PrimitiveSubstituted { .. }));
    }

    #[test]
    fn test_helical_defaults_face_width() {
        let mesh = helical_gear(&params(json!({"hand": "left"})), &mut Vec::new()).unwrap();
        assert_relative_eq!(mesh.bounds3().unwrap().max.z, 15.0, epsilon = 1e-4);
    }

    #[test]
    fn test_bevel_tapers() {
        let mesh = bevel_gear(&params(json!({})), &mut Vec::new()).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.z, 12.0, epsilon = 1e-4);
        // First section radius sits between the outer and the top radius
        assert!(b.max.x < 16.5 && b.max.x > 12.0);

        let bad = bevel_gear(&params(json!({"cone_angle_deg": 90.0})), &mut Vec::new());
        assert!(matches!(bad, Err(GeneratorError::InvalidParameter { .. })));
    }

    #[test]
    fn test_rack_length_and_holes() {
        let mut warnings = Vec::new();
        let mesh = rack(&params(json!({"module": 1.0, "teeth_count": 10})), &mut warnings).unwrap();
        let b = mesh.bounds3().unwrap();
        assert_relative_eq!(b.max.x, 10.0 * PI, epsilon = 1e-4);
        assert_relative_eq!(b.max.y, 20.0, epsilon = 1e-4);
        assert_relative_eq!(b.max.z, 15.0, epsilon = 1e-4);
        assert!(warnings.is_empty());

        let short = rack(&params(json!({"module": 4.0, "height_mm": 9.0})), &mut Vec::new());
        assert!(short.is_err());
    }
}

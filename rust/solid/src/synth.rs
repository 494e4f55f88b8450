// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Part model to triangulated solid

use crate::classify::{OutlineFeature, PrimitiveKind};
use crate::dims::PrimitiveDims;
use crate::features::{add_rings, BOSS, COLLAR};
use crate::primitives::{build_primitive, fallback_box};
use crate::report::{SolidReport, SolidSource, SynthesizedSolid};
use sketchpart_geometry::bool2d::{is_self_intersecting, is_valid_contour, repair_profile};
use sketchpart_geometry::extrusion::extrude_profile;
use sketchpart_geometry::profile::circle_contour;
use sketchpart_geometry::{Mesh, Point2, Profile2D, Result, SynthesisWarning};
use sketchpart_model::PartModel;
use tracing::{debug, warn};

/// Segments per through-hole circle in an extruded outline
pub const HOLE_SEGMENTS: usize = 32;

/// Builds a solid for every model; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidSynthesizer;

impl SolidSynthesizer {
    pub fn synthesize(&self, model: &PartModel) -> SynthesizedSolid {
        let thickness = model.thickness_mm();
        let kind = PrimitiveKind::classify(&model.part);
        let mut warnings = Vec::new();

        if model.geometry.outline.points_mm.len() >= 3 {
            match self.extrude_outline(model, thickness, &mut warnings) {
                Ok(mut mesh) => {
                    let features = kind.map_or(OutlineFeature::None, |k| k.outline_feature());
                    let added = add_outline_features(&mut mesh, model, features, thickness);
                    debug!(
                        part = %model.part,
                        triangles = mesh.triangle_count(),
                        features = added,
                        "outline extruded"
                    );
                    return finish(mesh, SolidSource::Outline, warnings);
                }
                Err(e) => {
                    warn!(part = %model.part, error = %e, "outline dropped");
                    warnings.push(SynthesisWarning::ProfileDropped {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let dims = PrimitiveDims::from_model(model);
        if let Some(kind) = kind {
            match build_primitive(kind, &dims, thickness, &mut warnings) {
                Ok(mesh) if !mesh.is_empty() => {
                    warn!(part = %model.part, kind = kind.as_str(), "using named primitive");
                    warnings.push(SynthesisWarning::PrimitiveSubstituted {
                        kind: kind.as_str().to_string(),
                    });
                    return finish(mesh, SolidSource::Primitive(kind), warnings);
                }
                Ok(_) => warn!(kind = kind.as_str(), "primitive came out empty"),
                Err(e) => warn!(kind = kind.as_str(), error = %e, "primitive failed"),
            }
        }

        warn!(part = %model.part, "using generic box");
        warnings.push(SynthesisWarning::PrimitiveSubstituted {
            kind: "box".to_string(),
        });
        finish(fallback_box(dims.scale, thickness), SolidSource::Fallback, warnings)
    }

    /// Outline with 32-segment holes, repaired when invalid, extruded by thickness
    fn extrude_outline(
        &self,
        model: &PartModel,
        thickness: f64,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> Result<Mesh> {
        let outer: Vec<Point2<f64>> = model
            .geometry
            .outline
            .points_mm
            .iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect();
        let mut profile = Profile2D::new(outer);
        for (center, radius) in through_holes(model) {
            profile.add_hole(circle_contour(center, radius, HOLE_SEGMENTS));
        }

        let invalid = is_self_intersecting(&profile.outer) || !is_valid_contour(&profile.outer);
        if invalid {
            profile = repair_profile(&profile)?;
            warn!(part = %model.part, "outline repaired");
            warnings.push(SynthesisWarning::ProfileRepaired);
        }

        match extrude_profile(&profile, thickness, None) {
            Ok(mesh) => Ok(mesh),
            Err(e) if !invalid => {
                // Holes crossing the outline can defeat triangulation
                debug!(error = %e, "retrying extrusion on repaired profile");
                let repaired = repair_profile(&profile)?;
                warnings.push(SynthesisWarning::ProfileRepaired);
                extrude_profile(&repaired, thickness, None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Holes with a resolved positive diameter
fn through_holes(model: &PartModel) -> Vec<(Point2<f64>, f64)> {
    model
        .geometry
        .holes
        .iter()
        .filter_map(|h| {
            let r = h.radius_mm().filter(|r| *r > 0.0)?;
            Some((Point2::new(h.center_mm.x, h.center_mm.y), r))
        })
        .collect()
}

fn add_outline_features(
    mesh: &mut Mesh,
    model: &PartModel,
    feature: OutlineFeature,
    thickness: f64,
) -> usize {
    let holes = through_holes(model);
    match feature {
        OutlineFeature::BossRings => add_rings(mesh, &BOSS, &holes, thickness),
        OutlineFeature::Collar => add_rings(mesh, &COLLAR, &holes[..holes.len().min(1)], thickness),
        OutlineFeature::None => 0,
    }
}

fn finish(mesh: Mesh, source: SolidSource, warnings: Vec<SynthesisWarning>) -> SynthesizedSolid {
    SynthesizedSolid {
        mesh,
        report: SolidReport::new(source, warnings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn model(part: &str, points: serde_json::Value, holes: serde_json::Value) -> PartModel {
        serde_json::from_value(json!({
            "part": part,
            "units": "mm",
            "scale": {"px_to_mm": 1.0},
            "material": {"name": "A5052"},
            "process": {"name": "sheet_metal"},
            "geometry": {"outline": {"type": "polygon", "points_mm": points}, "holes": holes},
            "constraints": [{"kind": "min_thickness", "value_mm": 4.0}],
            "provenance": {"vision": {"file": "x.png", "version": "0.1"}}
        }))
        .unwrap()
    }

    fn rect() -> serde_json::Value {
        json!([[0, 0], [100, 0], [100, 60], [0, 60]])
    }

    fn two_holes() -> serde_json::Value {
        json!([
            {"diameter_mm": 10.0, "center_mm": [25, 30]},
            {"diameter_mm": 10.0, "center_mm": [75, 30]}
        ])
    }

    #[test]
    fn test_plain_outline_extrusion() {
        let solid = SolidSynthesizer.synthesize(&model("bracket", rect(), two_holes()));
        assert_eq!(solid.source(), SolidSource::Outline);
        assert!(!solid.report.is_degraded());
        let b = solid.mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.z, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_link_outline_gets_bosses() {
        let plain = SolidSynthesizer.synthesize(&model("bracket", rect(), two_holes()));
        let link = SolidSynthesizer.synthesize(&model("link_1", rect(), two_holes()));
        assert_relative_eq!(link.mesh.bounds3().unwrap().max.z, 6.0, epsilon = 1e-9);
        assert!(link.mesh.triangle_count() > plain.mesh.triangle_count());
    }

    #[test]
    fn test_joint_gets_single_collar() {
        let solid = SolidSynthesizer.synthesize(&model("elbow joint", rect(), two_holes()));
        // Collar height max(3, 0.5 * 4)
        assert_relative_eq!(solid.mesh.bounds3().unwrap().max.z, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bowtie_outline_is_repaired() {
        let solid = SolidSynthesizer.synthesize(&model(
            "plate",
            json!([[0, 0], [40, 40], [40, 0], [0, 40]]),
            json!([]),
        ));
        assert_eq!(solid.source(), SolidSource::Outline);
        assert!(solid.report.details.contains(&SynthesisWarning::ProfileRepaired));
        assert!(!solid.mesh.is_empty());
    }

    #[test]
    fn test_degenerate_outline_falls_back_to_named_primitive() {
        let solid = SolidSynthesizer.synthesize(&model(
            "link",
            json!([[0, 0], [10, 0], [20, 0]]),
            json!([]),
        ));
        assert_eq!(solid.source(), SolidSource::Primitive(PrimitiveKind::Link));
        assert!(matches!(
            solid.report.details.first(),
            Some(SynthesisWarning::ProfileDropped { .. })
        ));
        assert!(!solid.mesh.is_empty());
    }

    #[test]
    fn test_empty_outline_dispatches_by_name() {
        let solid = SolidSynthesizer.synthesize(&model("motor_mount", json!([]), json!([])));
        assert_eq!(solid.source(), SolidSource::Primitive(PrimitiveKind::MotorMount));
        let b = solid.mesh.bounds3().unwrap();
        assert_relative_eq!(b.size().x, 80.0, epsilon = 1e-6);

        let unknown = SolidSynthesizer.synthesize(&model("widget", json!([]), json!([])));
        assert_eq!(unknown.source(), SolidSource::Fallback);
        assert_relative_eq!(unknown.mesh.bounds3().unwrap().size().x, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reach_scales_primitives() {
        let mut m = model("shaft", json!([]), json!([]));
        m.intent = json!({"arm_config": {"reach_mm": 420}});
        let solid = SolidSynthesizer.synthesize(&m);
        // 80 mm shaft at scale 1.4
        assert_relative_eq!(solid.mesh.bounds3().unwrap().size().z, 112.0, epsilon = 1e-4);
    }
}

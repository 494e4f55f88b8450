// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale resolution and part model assembly
//!
//! Pixel features plus a flat parameter map become a millimeter
//! [`PartModel`]. Assembly is a pure function of its inputs, so resolving
//! twice with the same map yields the same model.

use crate::document::{
    Bend, Constraint, Geometry, HoleMm, NamedSpec, OutlineMm, PartModel, Provenance, Scale,
    VisionSource, UNITS_MM,
};
use crate::params::ParameterMap;
use crate::report::{mean3, ResolutionReport, ResolutionWarning, VisionConfidence};
use crate::round3;
use serde_json::Value;
use sketchpart_vision::{CanonicalFeatureSet, Point2D};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_BEND_ANGLE_DEG: f64 = 90.0;
pub const DEFAULT_BEND_RADIUS_MM: f64 = 1.0;
pub const DEFAULT_MATERIAL: &str = "A5052";
pub const DEFAULT_PROCESS: &str = "sheet_metal";
pub const EDGE_DISTANCE_MULTIPLIER: f64 = 2.0;
pub const VISION_VERSION: &str = "0.1";

/// Relative spread of hole radii above which the sizes count as different
const HOLE_VARIATION_LIMIT: f64 = 0.08;

/// Metric clearance hole standards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleStandard {
    M3,
    M4,
    M5,
    M6,
    M8,
}

impl HoleStandard {
    /// Clearance diameter (medium fit)
    pub fn clearance_mm(&self) -> f64 {
        match self {
            HoleStandard::M3 => 3.4,
            HoleStandard::M4 => 4.5,
            HoleStandard::M5 => 5.5,
            HoleStandard::M6 => 6.6,
            HoleStandard::M8 => 9.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoleStandard::M3 => "M3",
            HoleStandard::M4 => "M4",
            HoleStandard::M5 => "M5",
            HoleStandard::M6 => "M6",
            HoleStandard::M8 => "M8",
        }
    }
}

impl FromStr for HoleStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M3" => Ok(HoleStandard::M3),
            "M4" => Ok(HoleStandard::M4),
            "M5" => Ok(HoleStandard::M5),
            "M6" => Ok(HoleStandard::M6),
            "M8" => Ok(HoleStandard::M8),
            other => Err(format!("unknown hole standard '{other}'")),
        }
    }
}

impl fmt::Display for HoleStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the pixel-to-millimeter factor was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleSource {
    Explicit,
    ReferenceWidth { width_mm: f64, width_px: f64 },
    Defaulted,
}

/// Pixel-to-millimeter scale resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleResolver;

impl ScaleResolver {
    /// `px_to_mm` if given, else reference width over outline pixel width, else 1.0
    pub fn resolve(&self, features: &CanonicalFeatureSet, params: &ParameterMap) -> (f64, ScaleSource) {
        if let Some(px_to_mm) = params.get_positive("px_to_mm") {
            return (px_to_mm, ScaleSource::Explicit);
        }

        let reference = params
            .get_positive("plate_width_mm")
            .or_else(|| params.get_positive("reference_width_mm"));
        if let (Some(width_mm), Some(width_px)) = (reference, features.outline().pixel_width()) {
            if width_px > 0.0 {
                return (width_mm / width_px, ScaleSource::ReferenceWidth { width_mm, width_px });
            }
        }

        (1.0, ScaleSource::Defaulted)
    }
}

/// Parameters after typing and defaulting
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    pub px_to_mm: f64,
    pub scale_source: ScaleSource,
    pub thickness_mm: Option<f64>,
    pub hole_standard: Option<HoleStandard>,
    pub hole_diameter_mm: Option<f64>,
    pub unify_holes: Option<bool>,
    pub bend_angle_deg: Option<f64>,
    pub bend_radius_mm: Option<f64>,
    pub part_name: String,
    pub category: Option<String>,
    pub material: String,
    pub process: String,
    pub intent: Value,
}

impl ResolvedParameters {
    pub fn from_map(features: &CanonicalFeatureSet, params: &ParameterMap) -> Self {
        let (px_to_mm, scale_source) = ScaleResolver.resolve(features, params);

        let intent = match params.get("intent") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            _ => Value::Object(Default::default()),
        };

        let part_name = params
            .get_str("part_name")
            .map(str::to_string)
            .or_else(|| {
                intent
                    .get("part_name")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            px_to_mm,
            scale_source,
            thickness_mm: params.get_positive("thickness_mm"),
            hole_standard: params.get_str("hole_standard").and_then(|s| s.parse().ok()),
            hole_diameter_mm: params.get_positive("hole_diameter_mm"),
            unify_holes: params.get_bool("unify_holes"),
            bend_angle_deg: params.get_positive("bend_angle_deg"),
            bend_radius_mm: params.get_positive("bend_radius_mm"),
            part_name,
            category: params.get_str("category").map(str::to_string),
            material: params
                .get_str("material")
                .unwrap_or(DEFAULT_MATERIAL)
                .to_string(),
            process: params
                .get_str("process")
                .unwrap_or(DEFAULT_PROCESS)
                .to_string(),
            intent,
        }
    }
}

/// Builds the millimeter model and its report
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelAssembler;

/// Assembled model plus how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub model: PartModel,
    pub report: ResolutionReport,
}

impl ModelAssembler {
    pub fn assemble(
        &self,
        features: &CanonicalFeatureSet,
        params: &ParameterMap,
        image_ref: &str,
    ) -> Resolution {
        let resolved = ResolvedParameters::from_map(features, params);
        let scale = resolved.px_to_mm;
        let mut report = ResolutionReport {
            scale_px_to_mm: scale,
            ..Default::default()
        };
        let mut trace = Vec::new();

        match resolved.scale_source {
            ScaleSource::Explicit => trace.push(format!("px_to_mm={scale} given")),
            ScaleSource::ReferenceWidth { width_mm, width_px } => trace.push(format!(
                "px_to_mm={scale} from reference width {width_mm} mm over {width_px} px"
            )),
            ScaleSource::Defaulted => {
                trace.push("px_to_mm=1 defaulted".to_string());
                report.warn(ResolutionWarning::ScaleDefaulted);
            }
        }

        let to_mm = |p: &Point2D| Point2D::new(round3(p.x * scale), round3(p.y * scale));

        let outline = OutlineMm {
            kind: features.outline().kind,
            points_mm: features.outline().points.iter().map(to_mm).collect(),
        };

        let (diameters, standard_label) = resolve_hole_diameters(features, &resolved, &mut report, &mut trace);
        let holes: Vec<HoleMm> = features
            .holes()
            .iter()
            .zip(&diameters)
            .map(|(h, d)| HoleMm {
                kind: "clearance".to_string(),
                standard: standard_label.clone(),
                diameter_mm: *d,
                center_mm: to_mm(&h.center),
            })
            .collect();

        // Only the first bend line is honored
        let bend = features.bend_lines().first().map(|b| Bend {
            line_mm: [to_mm(&b.line[0]), to_mm(&b.line[1])],
            angle_deg: resolved.bend_angle_deg.unwrap_or(DEFAULT_BEND_ANGLE_DEG),
            inner_radius_mm: resolved.bend_radius_mm.unwrap_or(DEFAULT_BEND_RADIUS_MM),
        });
        if features.bend_lines().len() > 1 {
            trace.push(format!(
                "{} bend lines detected; first one kept",
                features.bend_lines().len()
            ));
        }

        let mut constraints = Vec::new();
        match resolved.thickness_mm {
            Some(t) => constraints.push(Constraint::MinThickness { value_mm: t }),
            None => report.warn(ResolutionWarning::ThicknessUnresolved),
        }
        constraints.push(Constraint::BendRadiusGteThickness);
        constraints.push(Constraint::EdgeDistanceGte {
            multiplier: EDGE_DISTANCE_MULTIPLIER,
        });

        report.hole_standard = standard_label;
        report.hole_diameters_mm = diameters;
        report.vision_confidence = VisionConfidence {
            holes_avg: mean3(features.holes().iter().map(|h| h.confidence)),
            bend_lines_avg: mean3(features.bend_lines().iter().map(|b| b.confidence)),
        };

        debug!(
            part = %resolved.part_name,
            px_to_mm = scale,
            holes = holes.len(),
            bend = bend.is_some(),
            "part model assembled"
        );

        let model = PartModel {
            part: resolved.part_name,
            category: resolved.category,
            units: UNITS_MM.to_string(),
            scale: Scale { px_to_mm: scale },
            material: NamedSpec {
                name: resolved.material,
            },
            process: NamedSpec {
                name: resolved.process,
            },
            geometry: Geometry {
                outline,
                holes,
                bend,
            },
            constraints,
            intent: resolved.intent,
            provenance: Provenance {
                vision: VisionSource {
                    file: image_ref.to_string(),
                    version: VISION_VERSION.to_string(),
                },
                resolution: trace,
            },
        };

        Resolution { model, report }
    }
}

/// Diameter per hole plus the standard label shared by all holes
///
/// Precedence: explicit diameter, then named standard, then one mean
/// diameter when unifying, then per-hole pixel estimates.
fn resolve_hole_diameters(
    features: &CanonicalFeatureSet,
    resolved: &ResolvedParameters,
    report: &mut ResolutionReport,
    trace: &mut Vec<String>,
) -> (Vec<Option<f64>>, String) {
    let holes = features.holes();
    if holes.is_empty() {
        let label = resolved
            .hole_standard
            .map(|s| s.to_string())
            .unwrap_or_else(|| "custom".to_string());
        return (Vec::new(), label);
    }

    let estimates: Vec<f64> = holes
        .iter()
        .map(|h| h.radius * 2.0 * resolved.px_to_mm)
        .collect();

    let unify = resolved.unify_holes;
    if unify.is_none() {
        if let Some(cv) = coefficient_of_variation(&holes.iter().map(|h| h.radius).collect::<Vec<_>>()) {
            if cv > HOLE_VARIATION_LIMIT {
                report.warn(ResolutionWarning::HoleSizesVary {
                    coefficient_of_variation: round3(cv),
                });
            }
        }
    }

    let (uniform, label) = match (resolved.hole_diameter_mm, resolved.hole_standard) {
        (Some(d), standard) => {
            if let Some(s) = standard {
                report.warn(ResolutionWarning::ConflictingHoleSpec {
                    diameter_mm: d,
                    standard: s.to_string(),
                });
            }
            trace.push(format!("hole diameter {d} mm given"));
            (Some(d), "custom".to_string())
        }
        (None, Some(s)) => {
            trace.push(format!("hole standard {s} -> {} mm", s.clearance_mm()));
            (Some(s.clearance_mm()), s.to_string())
        }
        (None, None) if unify == Some(true) => {
            let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
            trace.push(format!("hole diameters unified to mean {}", round3(mean)));
            (Some(mean), "custom".to_string())
        }
        (None, None) => {
            trace.push("hole diameters estimated per hole from pixels".to_string());
            (None, "custom".to_string())
        }
    };

    if unify == Some(true) {
        report.decide("hole_size_normalized");
    }

    let diameters: Vec<Option<f64>> = match uniform {
        Some(d) => vec![Some(round3(d)); holes.len()],
        None => estimates
            .iter()
            .map(|d| (d.is_finite() && *d > 0.0).then(|| round3(*d)))
            .collect(),
    };

    let unresolved = diameters.iter().filter(|d| d.is_none()).count();
    if unresolved > 0 {
        report.warn(ResolutionWarning::HoleDiameterUnresolved { count: unresolved });
    }

    (diameters, label)
}

/// Population standard deviation over mean; `None` below two values or at zero mean
fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn features(value: Value) -> CanonicalFeatureSet {
        serde_json::from_value(value).unwrap()
    }

    fn plate_features() -> CanonicalFeatureSet {
        features(json!({
            "outline": {"points_px": [[20, 10], [220, 10], [220, 130], [20, 130]]},
            "holes": [
                {"center_px": [60, 70], "radius_px": 10, "confidence": 0.9},
                {"center_px": [180, 70], "radius_px": 14, "confidence": 0.7}
            ],
            "bend_lines": [
                {"line_px": [[120, 10], [120, 130]], "confidence": 0.6},
                {"line_px": [[20, 70], [220, 70]], "confidence": 1.0}
            ]
        }))
    }

    #[test]
    fn test_hole_standard_parsing() {
        assert_eq!("m5".parse::<HoleStandard>(), Ok(HoleStandard::M5));
        assert_eq!(HoleStandard::M8.clearance_mm(), 9.0);
        assert!("M7".parse::<HoleStandard>().is_err());
    }

    #[test]
    fn test_reference_width_scale() {
        let params = ParameterMap::new().with("plate_width_mm", 100);
        let r = ModelAssembler.assemble(&plate_features(), &params, "plate.png");
        assert_relative_eq!(r.model.scale.px_to_mm, 0.5);
        assert_eq!(r.model.geometry.outline.points_mm[1], Point2D::new(110.0, 5.0));
        assert_eq!(r.model.geometry.holes[0].center_mm, Point2D::new(30.0, 35.0));
        assert!(!r.report.warnings.contains(&ResolutionWarning::ScaleDefaulted));
    }

    #[test]
    fn test_explicit_scale_wins_over_reference() {
        let params = ParameterMap::new()
            .with("px_to_mm", 0.25)
            .with("plate_width_mm", 100);
        let r = ModelAssembler.assemble(&plate_features(), &params, "plate.png");
        assert_eq!(r.model.scale.px_to_mm, 0.25);
    }

    #[test]
    fn test_defaults_and_warnings() {
        let r = ModelAssembler.assemble(&plate_features(), &ParameterMap::new(), "plate.png");
        assert_eq!(r.model.part, "Unknown");
        assert_eq!(r.model.material.name, DEFAULT_MATERIAL);
        assert_eq!(r.model.process.name, DEFAULT_PROCESS);
        assert_eq!(r.model.scale.px_to_mm, 1.0);
        assert!(r.report.notes.iter().any(|n| n == "Scale not provided; px_to_mm assumed as 1.0"));
        assert!(r.report.warnings.contains(&ResolutionWarning::ThicknessUnresolved));
        assert!(r
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::HoleSizesVary { .. })));

        // Per-hole estimates: radius * 2 * scale
        assert_eq!(r.report.hole_diameters_mm, vec![Some(20.0), Some(28.0)]);
        assert_eq!(r.report.hole_standard, "custom");
        assert_eq!(r.report.vision_confidence.holes_avg, Some(0.8));
        assert_eq!(r.report.vision_confidence.bend_lines_avg, Some(0.8));
    }

    #[test]
    fn test_diameter_precedence() {
        let params = ParameterMap::new()
            .with("hole_diameter_mm", 6.0)
            .with("hole_standard", "M3");
        let r = ModelAssembler.assemble(&plate_features(), &params, "p");
        assert_eq!(r.report.hole_diameters_mm, vec![Some(6.0), Some(6.0)]);
        assert!(r
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::ConflictingHoleSpec { .. })));

        let params = ParameterMap::new().with("hole_standard", "M5");
        let r = ModelAssembler.assemble(&plate_features(), &params, "p");
        assert_eq!(r.report.hole_diameters_mm, vec![Some(5.5), Some(5.5)]);
        assert_eq!(r.model.geometry.holes[1].standard, "M5");
        assert_eq!(r.model.hole_standard(), Some("M5"));
    }

    #[test]
    fn test_unify_holes_forces_one_diameter() {
        let params = ParameterMap::new().with("unify_holes", "yes");
        let r = ModelAssembler.assemble(&plate_features(), &params, "p");
        let diameters: Vec<f64> = r.model.geometry.holes.iter().filter_map(|h| h.diameter_mm).collect();
        assert_eq!(diameters, vec![24.0, 24.0]);
        assert!(r.report.has_decision("hole_size_normalized"));
        assert!(!r
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::HoleSizesVary { .. })));
    }

    #[test]
    fn test_bend_and_constraints() {
        let params = ParameterMap::new()
            .with("thickness_mm", 2)
            .with("bend_angle_deg", 45);
        let r = ModelAssembler.assemble(&plate_features(), &params, "p");
        let bend = r.model.geometry.bend.as_ref().unwrap();
        assert_eq!(bend.line_mm[0], Point2D::new(120.0, 10.0));
        assert_eq!(bend.angle_deg, 45.0);
        assert_eq!(bend.inner_radius_mm, DEFAULT_BEND_RADIUS_MM);
        assert_eq!(
            r.model.constraints,
            vec![
                Constraint::MinThickness { value_mm: 2.0 },
                Constraint::BendRadiusGteThickness,
                Constraint::EdgeDistanceGte { multiplier: 2.0 },
            ]
        );
        assert_eq!(r.model.thickness_mm(), 2.0);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let params = ParameterMap::new()
            .with("plate_width_mm", 150)
            .with("hole_standard", "M4")
            .with("part_name", "bracket");
        let a = ModelAssembler.assemble(&plate_features(), &params, "p");
        let b = ModelAssembler.assemble(&plate_features(), &params, "p");
        assert_eq!(a, b);
        assert_eq!(a.model.part, "bracket");
    }

    #[test]
    fn test_empty_features() {
        let r = ModelAssembler.assemble(&CanonicalFeatureSet::default(), &ParameterMap::new(), "p");
        assert!(r.model.geometry.outline.points_mm.is_empty());
        assert!(r.model.geometry.holes.is_empty());
        assert!(r.model.geometry.bend.is_none());
        assert_eq!(r.model.constraints.len(), 2);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The millimeter part model document

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sketchpart_vision::{OutlineKind, Point2D};
use std::path::Path;

/// Thickness used downstream when none was resolved
pub const DEFAULT_THICKNESS_MM: f64 = 5.0;

pub const UNITS_MM: &str = "mm";

/// Canonical geometry and metadata for one part, in millimeters
///
/// A value type: changes go through [`PartModel::apply_patch`](crate::patch)
/// and produce a new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartModel {
    pub part: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub units: String,
    pub scale: Scale,
    pub material: NamedSpec,
    pub process: NamedSpec,
    pub geometry: Geometry,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default = "empty_object")]
    pub intent: Value,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub px_to_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSpec {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub outline: OutlineMm,
    #[serde(default)]
    pub holes: Vec<HoleMm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bend: Option<Bend>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineMm {
    #[serde(rename = "type", default)]
    pub kind: OutlineKind,
    #[serde(default)]
    pub points_mm: Vec<Point2D>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleMm {
    #[serde(rename = "type", default = "clearance")]
    pub kind: String,
    #[serde(default = "custom")]
    pub standard: String,
    /// `None` when no diameter could be resolved
    pub diameter_mm: Option<f64>,
    pub center_mm: Point2D,
}

impl HoleMm {
    pub fn radius_mm(&self) -> Option<f64> {
        self.diameter_mm.map(|d| d / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bend {
    pub line_mm: [Point2D; 2],
    pub angle_deg: f64,
    pub inner_radius_mm: f64,
}

/// Manufacturing rules attached to a model, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    MinThickness { value_mm: f64 },
    BendRadiusGteThickness,
    EdgeDistanceGte { multiplier: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub vision: VisionSource,
    /// Ordered trace of resolution decisions
    #[serde(default)]
    pub resolution: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionSource {
    pub file: String,
    pub version: String,
}

/// Axis-aligned 2D extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent2 {
    pub min: Point2D,
    pub max: Point2D,
}

impl Extent2 {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    fn include(&mut self, p: Point2D) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    fn around(p: Point2D) -> Self {
        Self { min: p, max: p }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn clearance() -> String {
    "clearance".to_string()
}

fn custom() -> String {
    "custom".to_string()
}

impl PartModel {
    /// Thickness from the `min_thickness` constraint, if any
    pub fn resolved_thickness_mm(&self) -> Option<f64> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::MinThickness { value_mm } if *value_mm > 0.0 => Some(*value_mm),
            _ => None,
        })
    }

    /// Thickness with the downstream default applied
    pub fn thickness_mm(&self) -> f64 {
        self.resolved_thickness_mm().unwrap_or(DEFAULT_THICKNESS_MM)
    }

    /// Extent of the outline, or of the holes when there is no outline
    pub fn extent(&self) -> Option<Extent2> {
        let geometry = &self.geometry;
        if !geometry.outline.points_mm.is_empty() {
            let mut points = geometry.outline.points_mm.iter().copied();
            let first = points.next()?;
            return Some(points.fold(Extent2::around(first), |mut e, p| {
                e.include(p);
                e
            }));
        }

        let mut extent: Option<Extent2> = None;
        for hole in &geometry.holes {
            let r = hole.radius_mm().unwrap_or(0.0);
            let c = hole.center_mm;
            let e = extent.get_or_insert_with(|| Extent2::around(c));
            e.include(Point2D::new(c.x - r, c.y - r));
            e.include(Point2D::new(c.x + r, c.y + r));
        }
        extent
    }

    /// Name of the hole standard when all holes share one
    pub fn hole_standard(&self) -> Option<&str> {
        let first = self.geometry.holes.first()?;
        self.geometry
            .holes
            .iter()
            .all(|h| h.standard == first.standard)
            .then_some(first.standard.as_str())
    }

    pub fn arm_reach_mm(&self) -> Option<f64> {
        self.intent
            .get("arm_config")
            .and_then(|c| c.get("reach_mm"))
            .and_then(crate::params::value_as_f64)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist a committed snapshot
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        crate::snapshot::write_json_atomic(path, self)
    }
}

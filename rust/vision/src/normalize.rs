// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical feature schema and the tolerant normalizer that produces it
//!
//! Feature payloads arrive from the extractor or from outside (hand-edited
//! JSON, other tools). The normalizer unifies field-name synonyms, coerces
//! numbers and drops anything malformed. It never fails.

use crate::types::{BendLine, Hole, Outline, OutlineKind, Point2D, RawFeatureSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confidence assigned when a payload omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Normalized features. Outline has 0 or at least 3 points, every hole has a
/// center and a positive radius, every bend line has exactly two points.
///
/// Deserialization always goes through [`FeatureNormalizer`], so any JSON
/// value yields a valid set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct CanonicalFeatureSet {
    outline: Outline,
    holes: Vec<Hole>,
    bend_lines: Vec<BendLine>,
    notes_regions: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part_hint_confidence: Option<f64>,
}

impl CanonicalFeatureSet {
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn bend_lines(&self) -> &[BendLine] {
        &self.bend_lines
    }

    pub fn notes_regions(&self) -> &[Value] {
        &self.notes_regions
    }

    pub fn part_hint(&self) -> Option<&str> {
        self.part_hint.as_deref()
    }

    pub fn part_hint_confidence(&self) -> Option<f64> {
        self.part_hint_confidence
    }

    pub fn is_empty(&self) -> bool {
        self.outline.is_empty() && self.holes.is_empty() && self.bend_lines.is_empty()
    }
}

impl From<Value> for CanonicalFeatureSet {
    fn from(value: Value) -> Self {
        FeatureNormalizer.normalize_value(&value)
    }
}

impl From<&RawFeatureSet> for CanonicalFeatureSet {
    fn from(raw: &RawFeatureSet) -> Self {
        FeatureNormalizer.normalize_raw(raw)
    }
}

/// Stateless payload normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    /// Normalize extractor output. The same rules apply as for JSON payloads.
    pub fn normalize_raw(&self, raw: &RawFeatureSet) -> CanonicalFeatureSet {
        match serde_json::to_value(raw) {
            Ok(value) => self.normalize_value(&value),
            Err(_) => CanonicalFeatureSet::default(),
        }
    }

    /// Normalize an arbitrary JSON payload
    pub fn normalize_value(&self, raw: &Value) -> CanonicalFeatureSet {
        let Some(obj) = raw.as_object() else {
            return CanonicalFeatureSet::default();
        };

        let outline_obj = obj.get("outline").and_then(Value::as_object);
        let points = outline_obj
            .and_then(|o| first_present(o, &["points_px", "coordinates", "points"]))
            .map(parse_points)
            .unwrap_or_default();
        // A ring needs three vertices
        let points = if points.len() < 3 { Vec::new() } else { points };

        let kind = outline_obj
            .and_then(|o| o.get("type"))
            .or_else(|| obj.get("outline_type"))
            .and_then(parse_outline_kind)
            .unwrap_or_else(|| OutlineKind::from_point_count(points.len()));

        let holes = array_items(obj.get("holes"))
            .filter_map(|h| h.as_object())
            .filter_map(parse_hole)
            .collect();

        let bend_lines = array_items(obj.get("bend_lines"))
            .filter_map(|b| b.as_object())
            .filter_map(parse_bend_line)
            .collect();

        let notes_regions = array_items(obj.get("notes_regions")).cloned().collect();

        CanonicalFeatureSet {
            outline: Outline { kind, points },
            holes,
            bend_lines,
            notes_regions,
            part_hint: obj
                .get("part_hint")
                .and_then(Value::as_str)
                .map(str::to_string),
            part_hint_confidence: obj.get("part_hint_confidence").and_then(number),
        }
    }
}

fn array_items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

/// First key whose value is present and not null
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn parse_outline_kind(value: &Value) -> Option<OutlineKind> {
    match value.as_str()?.to_ascii_lowercase().as_str() {
        "polygon" => Some(OutlineKind::Polygon),
        "spline" => Some(OutlineKind::Spline),
        _ => None,
    }
}

/// Numbers or numeric strings
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// `[x, y]` or `{"x": .., "y": ..}`
fn point(value: &Value) -> Option<Point2D> {
    match value {
        Value::Array(a) if a.len() >= 2 => Some(Point2D::new(number(&a[0])?, number(&a[1])?)),
        Value::Object(o) => Some(Point2D::new(number(o.get("x")?)?, number(o.get("y")?)?)),
        _ => None,
    }
}

fn parse_points(value: &Value) -> Vec<Point2D> {
    value
        .as_array()
        .map(|a| a.iter().filter_map(point).collect())
        .unwrap_or_default()
}

fn confidence(obj: &Map<String, Value>) -> f64 {
    obj.get("confidence")
        .and_then(number)
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn parse_hole(obj: &Map<String, Value>) -> Option<Hole> {
    let center = match first_present(obj, &["center_px", "center", "center_xy"]) {
        Some(c) => point(c)?,
        None => Point2D::new(
            number(obj.get("cx")?)?,
            number(obj.get("cy")?)?,
        ),
    };
    let radius = first_present(obj, &["radius_px", "radius"]).and_then(number)?;
    if radius <= 0.0 {
        return None;
    }
    Some(Hole {
        center,
        radius,
        confidence: confidence(obj),
    })
}

fn parse_bend_line(obj: &Map<String, Value>) -> Option<BendLine> {
    let endpoints: Vec<Point2D> = match obj.get("line_px").filter(|v| !v.is_null()) {
        Some(line) => {
            let items = line.as_array()?;
            if items.len() != 2 {
                return None;
            }
            items.iter().map(point).collect::<Option<Vec<_>>>()?
        }
        None => vec![point(obj.get("start")?)?, point(obj.get("end")?)?],
    };
    Some(BendLine {
        line: [endpoints[0], endpoints[1]],
        confidence: confidence(obj),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_yields_empty_set() {
        for value in [Value::Null, json!(42), json!("outline"), json!([1, 2])] {
            let set = FeatureNormalizer.normalize_value(&value);
            assert!(set.is_empty());
            assert_eq!(set.outline().kind, OutlineKind::Polygon);
        }
    }

    #[test]
    fn test_outline_synonyms_and_type_default() {
        let pts: Vec<Value> = (0..25).map(|i| json!([i, i * 2])).collect();
        let set = FeatureNormalizer.normalize_value(&json!({
            "outline": {"coordinates": pts}
        }));
        assert_eq!(set.outline().points.len(), 25);
        assert_eq!(set.outline().kind, OutlineKind::Spline);

        let set = FeatureNormalizer.normalize_value(&json!({
            "outline": {"points": [[0, 0], [10, 0], [10, 5]]},
            "outline_type": "spline"
        }));
        assert_eq!(set.outline().kind, OutlineKind::Spline);
        assert_eq!(set.outline().points.len(), 3);
    }

    #[test]
    fn test_short_outline_dropped() {
        let set = FeatureNormalizer.normalize_value(&json!({
            "outline": {"points_px": [[0, 0], [10, 0]]}
        }));
        assert!(set.outline().is_empty());
    }

    #[test]
    fn test_hole_synonyms_and_coercion() {
        let set = FeatureNormalizer.normalize_value(&json!({
            "holes": [
                {"center": [10, 20], "radius": "4.5"},
                {"cx": 1, "cy": 2, "radius_px": 3, "confidence": 0.9},
                {"center_xy": {"x": 5, "y": 6}, "radius": 2},
                {"center": [1, 1]},
                {"radius": 3},
                {"center": [1, 1], "radius": -2},
                "not a hole"
            ]
        }));
        let holes = set.holes();
        assert_eq!(holes.len(), 3);
        assert_eq!(holes[0].center, Point2D::new(10.0, 20.0));
        assert_eq!(holes[0].radius, 4.5);
        assert_eq!(holes[0].confidence, DEFAULT_CONFIDENCE);
        assert_eq!(holes[1].confidence, 0.9);
        assert_eq!(holes[2].center, Point2D::new(5.0, 6.0));
    }

    #[test]
    fn test_bend_line_forms() {
        let set = FeatureNormalizer.normalize_value(&json!({
            "bend_lines": [
                {"line_px": [[0, 0], [0, 50]], "confidence": 0.8},
                {"start": [1, 1], "end": [9, 9]},
                {"line_px": [[0, 0], [1, 1], [2, 2]]},
                {"start": [1, 1]}
            ]
        }));
        assert_eq!(set.bend_lines().len(), 2);
        assert_eq!(set.bend_lines()[1].confidence, DEFAULT_CONFIDENCE);
        assert_eq!(set.bend_lines()[1].line[1], Point2D::new(9.0, 9.0));
    }

    #[test]
    fn test_deserialize_goes_through_normalizer() {
        let set: CanonicalFeatureSet = serde_json::from_value(json!({
            "outline": {"type": "polygon", "points_px": [[0, 0], [4, 0], [4, 4], [0, 4]]},
            "holes": [{"center_px": [2, 2], "radius_px": 1}],
            "part_hint": "bracket",
            "part_hint_confidence": 0.7
        }))
        .unwrap();
        assert_eq!(set.holes().len(), 1);
        assert!(set.bend_lines().is_empty());
        assert_eq!(set.part_hint(), Some("bracket"));

        // Always emits all four feature keys
        let value = serde_json::to_value(&set).unwrap();
        for key in ["outline", "holes", "bend_lines", "notes_regions"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let again: CanonicalFeatureSet = serde_json::from_value(value).unwrap();
        assert_eq!(again, set);
    }
}

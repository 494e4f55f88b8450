// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat key/value parameter maps
//!
//! Values come from JSON files and `key=value` command-line pairs, so the
//! typed getters accept numeric strings and yes/no style booleans. Unknown
//! keys are carried along untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap(Map<String, Value>);

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value; anything but an object yields an empty map
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Parse `key=value`. The value is read as JSON when it parses, else kept as text.
    pub fn parse_assignment(pair: &str) -> Option<(String, Value)> {
        let (key, raw) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Some((key.to_string(), value))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: &ParameterMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finite number or numeric string
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(value_as_f64)
    }

    /// Finite positive number
    pub fn get_positive(&self, key: &str) -> Option<f64> {
        self.get_f64(key).filter(|v| *v > 0.0)
    }

    /// Non-blank string, trimmed
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `true`/`false`, or y/yes/true/1 and n/no/false/0 in any case
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_f64() {
                Some(v) if v == 1.0 => Some(true),
                Some(v) if v == 0.0 => Some(false),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Some(true),
                "n" | "no" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Map<String, Value>> for ParameterMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assignment_parsing() {
        assert_eq!(
            ParameterMap::parse_assignment("thickness_mm=4"),
            Some(("thickness_mm".to_string(), json!(4)))
        );
        assert_eq!(
            ParameterMap::parse_assignment("hole_standard = M5"),
            Some(("hole_standard".to_string(), json!("M5")))
        );
        assert_eq!(
            ParameterMap::parse_assignment("unify_holes=true"),
            Some(("unify_holes".to_string(), json!(true)))
        );
        assert_eq!(ParameterMap::parse_assignment("novalue"), None);
        assert_eq!(ParameterMap::parse_assignment("=3"), None);
    }

    #[test]
    fn test_typed_getters() {
        let params = ParameterMap::from_value(json!({
            "a": "2.5",
            "b": -1,
            "c": "yes",
            "d": 0,
            "e": "  ",
            "f": null,
            "g": "maybe"
        }));
        assert_eq!(params.get_f64("a"), Some(2.5));
        assert_eq!(params.get_positive("b"), None);
        assert_eq!(params.get_bool("c"), Some(true));
        assert_eq!(params.get_bool("d"), Some(false));
        assert_eq!(params.get_bool("g"), None);
        assert_eq!(params.get_str("e"), None);
        assert!(!params.contains("f"));
        assert!(params.contains("a"));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = ParameterMap::new().with("x", 1).with("y", 2);
        base.merge(&ParameterMap::new().with("y", 3));
        assert_eq!(base.get_f64("x"), Some(1.0));
        assert_eq!(base.get_f64("y"), Some(3.0));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter preparation against a part's schema
//!
//! Requests go through four steps before reaching a generator: missing
//! values are filled from schema defaults, values are coerced to their
//! declared types, ranges/enums/expression constraints are checked, and a
//! uniform scale factor is applied to every length parameter. Problems
//! found along the way are warnings; only the generator itself can fail.

use crate::catalog::{ParamType, PartDefinition};
use crate::expr;
use serde_json::{Number, Value};
use sketchpart_model::params::value_as_f64;
use sketchpart_model::ParameterMap;
use tracing::debug;

/// Copy `params` and add schema defaults for anything missing or null
pub fn fill_defaults(definition: &PartDefinition, params: &ParameterMap) -> ParameterMap {
    let mut filled = params.clone();
    for (name, spec) in &definition.parameters {
        if filled.contains(name) {
            continue;
        }
        if let Some(default) = &spec.default {
            filled.insert(name.clone(), default.clone());
        }
    }
    filled
}

/// Convert every declared parameter to its schema type.
///
/// Values that cannot be converted fall back to the schema default (or are
/// left untouched when there is none) and produce a warning.
pub fn coerce(definition: &PartDefinition, params: &ParameterMap, warnings: &mut Vec<String>) -> ParameterMap {
    let mut coerced = params.clone();
    for (name, spec) in &definition.parameters {
        let Some(value) = params.get(name) else {
            continue;
        };
        match coerce_value(name, spec.kind, value, warnings) {
            Some(converted) => coerced.insert(name.clone(), converted),
            None => {
                warnings.push(format!(
                    "{name}: cannot read {value} as {}",
                    spec.kind.as_str()
                ));
                if let Some(default) = &spec.default {
                    coerced.insert(name.clone(), default.clone());
                }
            }
        }
    }
    coerced
}

fn coerce_value(name: &str, kind: ParamType, value: &Value, warnings: &mut Vec<String>) -> Option<Value> {
    match kind {
        ParamType::Int => {
            let v = value_as_f64(value)?;
            if v.fract() != 0.0 {
                warnings.push(format!("{name}: expected int, got float {v}"));
            }
            Some(Value::from(v.trunc() as i64))
        }
        ParamType::Float => value_as_f64(value).and_then(Number::from_f64).map(Value::Number),
        ParamType::Bool => {
            let probe = ParameterMap::new().with(name, value.clone());
            probe.get_bool(name).map(Value::Bool)
        }
        ParamType::Text => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ParamType::Any => Some(value.clone()),
    }
}

/// Range, enum and expression checks; returns one message per violation
pub fn validate(definition: &PartDefinition, params: &ParameterMap) -> Vec<String> {
    let mut warnings = Vec::new();

    for (name, spec) in &definition.parameters {
        let Some(value) = params.get(name) else {
            continue;
        };
        if let Some(v) = value_as_f64(value).filter(|_| value.is_number()) {
            if let Some(min) = spec.min.filter(|min| v < *min) {
                warnings.push(format!("{name}: value {v} below minimum {min}"));
            }
            if let Some(max) = spec.max.filter(|max| v > *max) {
                warnings.push(format!("{name}: value {v} above maximum {max}"));
            }
        }
        if let Some(allowed) = &spec.enum_values {
            if !allowed.iter().any(|a| same_value(a, value)) {
                let listed: Vec<String> = allowed.iter().map(display_value).collect();
                warnings.push(format!(
                    "{name}: value {} not in allowed values [{}]",
                    display_value(value),
                    listed.join(", ")
                ));
            }
        }
    }

    for constraint in &definition.constraints {
        if constraint.kind != "expression" {
            continue;
        }
        let Some(expression) = constraint.expression.as_deref() else {
            continue;
        };
        match expr::evaluate(expression, params) {
            Ok(true) => {}
            Ok(false) => warnings.push(
                constraint
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Constraint failed: {expression}")),
            ),
            Err(e) => debug!(part = %definition.id, expression, error = %e, "constraint skipped"),
        }
    }
    warnings
}

/// Multiply every numeric length parameter by `scale`
pub fn apply_scale(definition: &PartDefinition, params: &ParameterMap, scale: f64) -> ParameterMap {
    if scale == 1.0 {
        return params.clone();
    }
    let mut scaled = params.clone();
    for (name, spec) in &definition.parameters {
        if !spec.is_length() {
            continue;
        }
        let Some(value) = params.get(name).filter(|v| v.is_number()).and_then(value_as_f64) else {
            continue;
        };
        if let Some(n) = Number::from_f64(value * scale) {
            scaled.insert(name.clone(), Value::Number(n));
        }
    }
    scaled
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

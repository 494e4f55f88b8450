// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Patch transitions on part models
//!
//! Only `geometry`, `constraints` and `intent` can change after resolution.
//! Applying a patch returns a new model and leaves the original untouched.

use crate::document::{Constraint, Geometry, PartModel};
use crate::error::{ModelError, Result};
use serde_json::Value;
use std::path::Path;

/// Fields fixed once a model has been resolved
pub const IMMUTABLE_FIELDS: [&str; 4] = ["scale", "provenance", "units", "part"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartModelPatch {
    pub geometry: Option<Geometry>,
    pub constraints: Option<Vec<Constraint>>,
    pub intent: Option<Value>,
}

impl PartModelPatch {
    pub fn is_empty(&self) -> bool {
        self.geometry.is_none() && self.constraints.is_none() && self.intent.is_none()
    }

    /// Validate a JSON patch document
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ModelError::InvalidPatch("patch must be a JSON object".into()))?;

        let mut patch = PartModelPatch::default();
        for (key, v) in obj {
            match key.as_str() {
                "geometry" => patch.geometry = Some(serde_json::from_value(v.clone())?),
                "constraints" => patch.constraints = Some(serde_json::from_value(v.clone())?),
                "intent" => {
                    if !v.is_object() {
                        return Err(ModelError::InvalidPatch("intent must be an object".into()));
                    }
                    patch.intent = Some(v.clone());
                }
                k if IMMUTABLE_FIELDS.contains(&k) => {
                    return Err(ModelError::ImmutableField(k.to_string()))
                }
                other => {
                    return Err(ModelError::InvalidPatch(format!("unknown field '{other}'")))
                }
            }
        }
        Ok(patch)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_value(&value)
    }
}

impl PartModel {
    /// New model with the patched fields replaced
    pub fn apply_patch(&self, patch: &PartModelPatch) -> PartModel {
        let mut next = self.clone();
        if let Some(geometry) = &patch.geometry {
            next.geometry = geometry.clone();
        }
        if let Some(constraints) = &patch.constraints {
            next.constraints = constraints.clone();
        }
        if let Some(intent) = &patch.intent {
            next.intent = intent.clone();
        }
        tracing::debug!(
            geometry = patch.geometry.is_some(),
            constraints = patch.constraints.is_some(),
            intent = patch.intent.is_some(),
            "patch applied"
        );
        next
    }
}

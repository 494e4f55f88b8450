// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric part generators
//!
//! A generator turns a resolved parameter map into a closed mesh in
//! millimeters. Generators are looked up by their catalog binding
//! (`module.function`) in a [`GeneratorRegistry`]; the built-in set covers
//! gears, fasteners, structural parts and drive components.
//!
//! Generators read their own defaults for anything missing, so they can be
//! called directly as well as through the validated pipeline.

pub mod drive;
pub mod fasteners;
pub mod gears;
pub mod structural;

use crate::catalog::GeneratorBinding;
use crate::error::{GeneratorError, GeneratorResult};
use rustc_hash::FxHashMap;
use sketchpart_geometry::profile::{circle_contour, rounded_rectangle, translate_contour};
use sketchpart_geometry::{extrude_profile_at, Mesh, Point2, Profile2D, SynthesisWarning};
use sketchpart_model::ParameterMap;
use std::sync::Arc;

/// Builds one kind of part
pub trait PartGenerator: Send + Sync {
    /// Build the mesh; recoverable degradations go to `warnings`
    fn generate(
        &self,
        params: &ParameterMap,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> GeneratorResult<Mesh>;
}

impl<F> PartGenerator for F
where
    F: Fn(&ParameterMap, &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> + Send + Sync,
{
    fn generate(
        &self,
        params: &ParameterMap,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> GeneratorResult<Mesh> {
        self(params, warnings)
    }
}

/// Generator lookup by catalog binding
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: FxHashMap<String, Arc<dyn PartGenerator>>,
}

impl GeneratorRegistry {
    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            generators: FxHashMap::default(),
        }
    }

    /// Registry with every built-in generator
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        gears::register(&mut registry);
        fasteners::register(&mut registry);
        structural::register(&mut registry);
        drive::register(&mut registry);
        registry
    }

    /// Register (or replace) the generator for a binding
    pub fn register(&mut self, binding: GeneratorBinding, generator: impl PartGenerator + 'static) {
        self.generators.insert(binding.key(), Arc::new(generator));
    }

    pub fn get(&self, binding: &GeneratorBinding) -> Option<Arc<dyn PartGenerator>> {
        self.generators.get(&binding.key()).cloned()
    }

    /// Registered binding keys, sorted
    pub fn bindings(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("bindings", &self.bindings())
            .finish()
    }
}

/// Typed reads with per-generator defaults
pub(crate) struct Args<'a>(pub &'a ParameterMap);

impl<'a> Args<'a> {
    pub fn f64(&self, key: &str, default: f64) -> f64 {
        self.0.get_f64(key).unwrap_or(default)
    }

    pub fn opt_f64(&self, key: &str) -> Option<f64> {
        self.0.get_f64(key)
    }

    /// Must be finite and strictly positive
    pub fn positive(&self, key: &str, default: f64) -> GeneratorResult<f64> {
        let value = self.f64(key, default);
        if value > 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(GeneratorError::invalid(key, format!("must be positive, got {value}")))
        }
    }

    /// Clamped at zero
    pub fn non_negative(&self, key: &str, default: f64) -> f64 {
        self.f64(key, default).max(0.0)
    }

    pub fn count(&self, key: &str, default: usize) -> usize {
        match self.0.get_f64(key) {
            Some(v) if v >= 0.0 => v.round() as usize,
            _ => default,
        }
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.0.get_bool(key).unwrap_or(default)
    }

    pub fn text(&self, key: &str, default: &'a str) -> &'a str {
        self.0.get_str(key).unwrap_or(default)
    }
}

/// Extrude and wrap geometry errors
pub(crate) fn extrude(profile: &Profile2D, z0: f64, height: f64) -> GeneratorResult<Mesh> {
    Ok(extrude_profile_at(profile, z0, height)?)
}

/// Circle of `radius` around the origin, bored when `bore_radius` is positive
pub(crate) fn disc(radius: f64, bore_radius: f64, segments: usize) -> Profile2D {
    let mut profile = Profile2D::new(circle_contour(Point2::origin(), radius, segments));
    if bore_radius > 0.0 && bore_radius < radius {
        profile.add_hole(circle_contour(Point2::origin(), bore_radius, segments));
    }
    profile
}

/// Rounded rectangle with its lower-left corner at the origin
pub(crate) fn corner_rounded_rect(width: f64, height: f64, radius: f64) -> Vec<Point2<f64>> {
    translate_contour(&rounded_rectangle(width, height, radius, 8), width / 2.0, height / 2.0)
}

/// Concatenate meshes without welding
pub(crate) fn combine(parts: Vec<Mesh>) -> GeneratorResult<Mesh> {
    let mut combined = Mesh::new();
    combined.merge_all(&parts);
    if combined.is_empty() {
        return Err(GeneratorError::Empty);
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_registry_matches_catalog() {
        let registry = GeneratorRegistry::standard();
        let catalog = crate::PartCatalog::standard();
        assert_eq!(registry.bindings().len(), 15);
        for part in catalog.all_parts() {
            assert!(registry.get(&part.generator).is_some(), "{} unbound", part.id);
        }
    }

    #[test]
    fn test_closure_registration() {
        let mut registry = GeneratorRegistry::empty();
        registry.register(
            GeneratorBinding::new("custom", "cube"),
            |params: &ParameterMap, _: &mut Vec<SynthesisWarning>| -> GeneratorResult<Mesh> {
                let side = Args(params).positive("side_mm", 10.0)?;
                Ok(sketchpart_geometry::primitives::box_mesh(side, side, side))
            },
        );
        let generator = registry.get(&GeneratorBinding::new("custom", "cube")).unwrap();
        let mesh = generator
            .generate(&ParameterMap::new().with("side_mm", 4), &mut Vec::new())
            .unwrap();
        assert_eq!(mesh.bounds3().unwrap().size().x, 4.0);
        assert!(registry.get(&GeneratorBinding::new("custom", "sphere")).is_none());
    }

    #[test]
    fn test_args_defaults_and_checks() {
        let params = ParameterMap::from_value(json!({"a": "3.5", "n": 4.6, "neg": -1, "flag": "yes"}));
        let args = Args(&params);
        assert_eq!(args.f64("a", 0.0), 3.5);
        assert_eq!(args.f64("missing", 7.0), 7.0);
        assert_eq!(args.count("n", 0), 5);
        assert_eq!(args.count("neg", 2), 2);
        assert!(args.flag("flag", false));
        assert_eq!(args.text("missing", "hex"), "hex");
        assert!(args.positive("neg", 1.0).is_err());
        assert_eq!(args.non_negative("neg", 1.0), 0.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog-driven part generation
//!
//! [`PartFactory`] ties a catalog to a generator registry. A request is
//! prepared against the part's schema (see [`crate::validate`]) and then
//! handed to the bound generator. Unlike outline synthesis there is no
//! lenient fallback here: an unknown part or a failing generator is an
//! error, while schema violations travel with the mesh as warnings.

use crate::catalog::PartCatalog;
use crate::error::{GeneratorError, PartsError, Result};
use crate::generators::GeneratorRegistry;
use crate::validate;
use serde::{Deserialize, Serialize};
use sketchpart_geometry::{Bounds3, Mesh, SynthesisWarning};
use sketchpart_model::ParameterMap;
use tracing::{debug, warn};

/// Most copies a single request may ask for
pub const MAX_QUANTITY: usize = 100;

/// Reject copy counts above [`MAX_QUANTITY`]
pub fn check_quantity(part_id: &str, quantity: usize) -> Result<()> {
    if quantity > MAX_QUANTITY {
        return Err(PartsError::QuantityTooLarge {
            part_id: part_id.to_string(),
            requested: quantity,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// A generated part and what went into it
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    pub mesh: Mesh,
    pub part_id: String,
    /// Parameters after defaults, coercion and scaling
    pub parameters_used: ParameterMap,
    pub bounds: Option<Bounds3>,
    pub warnings: Vec<SynthesisWarning>,
}

/// One line of an assembly request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRequest {
    pub part_id: String,
    #[serde(default)]
    pub parameters: ParameterMap,
    #[serde(default = "default_quantity")]
    pub quantity: usize,
}

fn default_quantity() -> usize {
    1
}

impl PartRequest {
    pub fn new(part_id: impl Into<String>, parameters: ParameterMap) -> Self {
        Self {
            part_id: part_id.into(),
            parameters,
            quantity: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity;
        self
    }
}

/// One physical copy of a requested part
#[derive(Debug, Clone)]
pub struct PartInstance {
    pub part_id: String,
    /// 1-based copy number within its request
    pub instance: usize,
    pub mesh: Mesh,
    pub parameters: ParameterMap,
}

impl PartInstance {
    /// File-friendly name, `part_id_instance`
    pub fn label(&self) -> String {
        format!("{}_{}", self.part_id, self.instance)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssemblyOutput {
    pub instances: Vec<PartInstance>,
    /// Messages prefixed with the part id they concern
    pub warnings: Vec<String>,
}

/// Generates parts from a catalog
#[derive(Debug, Clone)]
pub struct PartFactory<'a> {
    catalog: &'a PartCatalog,
    registry: GeneratorRegistry,
}

impl<'a> PartFactory<'a> {
    /// Factory using the built-in generators
    pub fn new(catalog: &'a PartCatalog) -> Self {
        Self::with_registry(catalog, GeneratorRegistry::standard())
    }

    pub fn with_registry(catalog: &'a PartCatalog, registry: GeneratorRegistry) -> Self {
        Self { catalog, registry }
    }

    pub fn catalog(&self) -> &PartCatalog {
        self.catalog
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Resolve the final parameter set for `part_id`, with schema warnings
    pub fn prepare(&self, part_id: &str, params: &ParameterMap, scale: f64) -> Result<(ParameterMap, Vec<String>)> {
        let definition = self
            .catalog
            .get(part_id)
            .ok_or_else(|| PartsError::NotFound(part_id.to_string()))?;
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(PartsError::InvalidScale(scale));
        }

        let mut warnings = Vec::new();
        let filled = validate::fill_defaults(definition, params);
        let coerced = validate::coerce(definition, &filled, &mut warnings);
        warnings.extend(validate::validate(definition, &coerced));
        let scaled = validate::apply_scale(definition, &coerced, scale);
        Ok((scaled, warnings))
    }

    /// Build one part
    pub fn generate(&self, part_id: &str, params: &ParameterMap, scale: f64) -> Result<GeneratedMesh> {
        let (parameters, schema_warnings) = self.prepare(part_id, params, scale)?;
        let definition = self
            .catalog
            .get(part_id)
            .ok_or_else(|| PartsError::NotFound(part_id.to_string()))?;
        let generator = self
            .registry
            .get(&definition.generator)
            .ok_or_else(|| PartsError::GeneratorMissing {
                part_id: part_id.to_string(),
                binding: definition.generator.key(),
            })?;

        for w in &schema_warnings {
            warn!(part_id, warning = %w, "parameter check");
        }
        let mut warnings: Vec<SynthesisWarning> =
            schema_warnings.into_iter().map(SynthesisWarning::parameter).collect();

        debug!(part_id, scale, binding = %definition.generator.key(), "generating part");
        let mesh = generator
            .generate(&parameters, &mut warnings)
            .and_then(|mesh| if mesh.is_empty() { Err(GeneratorError::Empty) } else { Ok(mesh) })
            .map_err(|source| PartsError::GenerationFailed {
                part_id: part_id.to_string(),
                source,
            })?;

        let bounds = mesh.bounds3();
        debug!(part_id, triangles = mesh.triangle_count(), warnings = warnings.len(), "part generated");
        Ok(GeneratedMesh {
            mesh,
            part_id: part_id.to_string(),
            parameters_used: parameters,
            bounds,
            warnings,
        })
    }

    /// Build every requested instance. Failures, including oversized
    /// quantities, become warnings.
    pub fn generate_assembly(&self, requests: &[PartRequest], scale: f64) -> AssemblyOutput {
        let mut output = AssemblyOutput::default();
        for request in requests {
            if request.quantity == 0 {
                continue;
            }
            let id = &request.part_id;
            if let Err(e) = check_quantity(id, request.quantity) {
                warn!(part_id = %id, quantity = request.quantity, "assembly part skipped");
                output.warnings.push(format!("{id}: {e}"));
                continue;
            }
            match self.generate(id, &request.parameters, scale) {
                Ok(generated) => {
                    output
                        .warnings
                        .extend(generated.warnings.iter().map(|w| format!("{id}: {w}")));
                    // Generators are deterministic, so copies share one build
                    for instance in 1..=request.quantity {
                        output.instances.push(PartInstance {
                            part_id: id.clone(),
                            instance,
                            mesh: generated.mesh.clone(),
                            parameters: generated.parameters_used.clone(),
                        });
                    }
                }
                Err(e) => {
                    warn!(part_id = %id, error = %e, "assembly part skipped");
                    output.warnings.push(format!("{id}: Generation failed - {e}"));
                }
            }
        }
        output
    }
}

/// Build one part from `catalog` with the built-in generators
pub fn generate_part(catalog: &PartCatalog, part_id: &str, params: &ParameterMap, scale: f64) -> Result<GeneratedMesh> {
    PartFactory::new(catalog).generate(part_id, params, scale)
}

/// Build all requested parts from `catalog` with the built-in generators
pub fn generate_assembly(catalog: &PartCatalog, requests: &[PartRequest], scale: f64) -> AssemblyOutput {
    PartFactory::new(catalog).generate_assembly(requests, scale)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for catalog and generation calls
pub type Result<T> = std::result::Result<T, PartsError>;

/// Result type inside a single generator
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;

#[derive(Error, Debug)]
pub enum PartsError {
    #[error("Unknown part ID: {0}")]
    NotFound(String),

    #[error("No generator registered for {part_id}: {binding}")]
    GeneratorMissing { part_id: String, binding: String },

    #[error("Failed to generate mesh for {part_id}: {source}")]
    GenerationFailed {
        part_id: String,
        #[source]
        source: GeneratorError,
    },

    #[error("Scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("Quantity {requested} for {part_id} exceeds the limit of {max}")]
    QuantityTooLarge {
        part_id: String,
        requested: usize,
        max: usize,
    },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a generator could not produce a mesh
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("produced no geometry")]
    Empty,

    #[error(transparent)]
    Geometry(#[from] sketchpart_geometry::Error),
}

impl GeneratorError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

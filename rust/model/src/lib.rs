// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Millimeter part models
//!
//! Resolves pixel-space sketch features and a flat parameter map into a
//! [`PartModel`] document plus a [`ResolutionReport`]. Models are values:
//! edits go through [`PartModelPatch`] and produce new models, and only
//! committed snapshots are written to disk.

pub mod document;
pub mod error;
pub mod params;
pub mod patch;
pub mod report;
pub mod resolve;
pub mod snapshot;

pub use document::{
    Bend, Constraint, Extent2, Geometry, HoleMm, NamedSpec, OutlineMm, PartModel, Provenance,
    Scale, VisionSource, DEFAULT_THICKNESS_MM,
};
pub use error::{ModelError, Result};
pub use params::ParameterMap;
pub use patch::PartModelPatch;
pub use report::{ResolutionReport, ResolutionWarning, VisionConfidence};
pub use resolve::{HoleStandard, ModelAssembler, Resolution, ScaleResolver, ScaleSource};
pub use snapshot::write_json_atomic;

/// Round to three decimals (micrometer precision)
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

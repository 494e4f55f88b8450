// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solids from part models
//!
//! A model with an outline is extruded by its thickness, with raised rings
//! around the holes of links, bases and joints. Without a usable outline
//! the part name is classified once into a [`PrimitiveKind`] and the
//! matching primitive is built instead. Synthesis always yields a mesh;
//! every degradation is listed in the [`SolidReport`].

pub mod classify;
pub mod dims;
pub mod features;
pub mod primitives;
pub mod report;
pub mod synth;

pub use classify::{OutlineFeature, PrimitiveKind};
pub use dims::{reach_scale, PrimitiveDims};
pub use report::{SolidReport, SolidSource, SynthesizedSolid};
pub use synth::SolidSynthesizer;

use sketchpart_model::PartModel;
use std::path::Path;

/// Synthesize a model's solid and write it as binary STL
pub fn write_solid(model: &PartModel, path: impl AsRef<Path>) -> sketchpart_geometry::Result<SolidReport> {
    let solid = SolidSynthesizer.synthesize(model);
    sketchpart_geometry::stl::write_stl(&solid.mesh, path.as_ref())?;
    tracing::info!(
        part = %model.part,
        triangles = solid.mesh.triangle_count(),
        path = %path.as_ref().display(),
        "solid written"
    );
    Ok(solid.report)
}

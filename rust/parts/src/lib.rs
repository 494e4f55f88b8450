// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Standard parts
//!
//! A catalog of parametric mechanical parts (gears, fasteners, structural
//! pieces, drive components), the generators that turn parameters into
//! meshes, and a composer that lays several meshes out side by side.
//!
//! ```rust,ignore
//! use sketchpart_parts::{generate_part, PartCatalog};
//! use sketchpart_model::ParameterMap;
//!
//! let catalog = PartCatalog::standard();
//! let bolt = generate_part(&catalog, "bolt", &ParameterMap::new().with("size", "M5"), 1.0)?;
//! println!("{} triangles", bolt.mesh.triangle_count());
//! ```

pub mod assembly;
pub mod catalog;
pub mod error;
pub mod expr;
pub mod generators;
pub mod pipeline;
pub mod validate;

pub use assembly::{Assembly, AssemblyComposer, Placement, DEFAULT_SPACING_MM};
pub use catalog::{GeneratorBinding, ParamType, ParameterSpec, PartCatalog, PartDefinition};
pub use error::{GeneratorError, GeneratorResult, PartsError, Result};
pub use generators::{GeneratorRegistry, PartGenerator};
pub use pipeline::{
    check_quantity, generate_assembly, generate_part, AssemblyOutput, GeneratedMesh, PartFactory, PartInstance,
    PartRequest, MAX_QUANTITY,
};

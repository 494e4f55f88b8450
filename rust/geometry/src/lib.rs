// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SketchPart Geometry
//!
//! Millimeter-space mesh building blocks shared by the solid synthesizer and
//! the parametric part generators: earcutr-triangulated profiles, straight
//! extrusion, i_overlay based 2D repair, csgrs mesh differences, solid
//! primitives and STL I/O.

pub mod bool2d;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod primitives;
pub mod profile;
pub mod stl;
pub mod warning;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use csg::{subtract_or_keep, CutOutcome};
pub use error::{Error, Result};
pub use extrusion::{apply_transform, extrude_profile, extrude_profile_at};
pub use mesh::{Bounds3, Mesh};
pub use profile::Profile2D;
pub use warning::SynthesisWarning;

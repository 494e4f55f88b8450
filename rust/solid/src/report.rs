// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::classify::PrimitiveKind;
use serde::Serialize;
use sketchpart_geometry::{Mesh, SynthesisWarning};

/// Where a synthesized solid came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum SolidSource {
    /// Extruded part outline
    Outline,
    /// Named primitive chosen from the part name
    Primitive(PrimitiveKind),
    /// Generic flat box
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolidReport {
    pub source: SolidSource,
    /// Display text of every degradation, in order
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub details: Vec<SynthesisWarning>,
}

impl SolidReport {
    pub fn new(source: SolidSource, warnings: Vec<SynthesisWarning>) -> Self {
        Self {
            source,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            details: warnings,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.details.is_empty()
    }
}

/// A solid plus the report describing how it was built
#[derive(Debug, Clone)]
pub struct SynthesizedSolid {
    pub mesh: Mesh,
    pub report: SolidReport,
}

impl SynthesizedSolid {
    pub fn source(&self) -> SolidSource {
        self.report.source
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal outcomes of mesh synthesis

use std::fmt;

/// Something was degraded while producing a mesh, but a mesh was produced
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisWarning {
    /// A boolean cut failed and the uncut shape was kept
    BooleanFailed { feature: String, reason: String },
    /// An invalid outline was rebuilt before extrusion
    ProfileRepaired,
    /// The outline could not be extruded at all
    ProfileDropped { reason: String },
    /// A named primitive stands in for the outline
    PrimitiveSubstituted { kind: String },
    /// Parameter validation finding; generation still ran
    Parameter { message: String },
}

impl SynthesisWarning {
    pub fn parameter(message: impl Into<String>) -> Self {
        SynthesisWarning::Parameter {
            message: message.into(),
        }
    }
}

impl fmt::Display for SynthesisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisWarning::BooleanFailed { feature, reason } => {
                write!(f, "{feature} cut failed, shape left uncut: {reason}")
            }
            SynthesisWarning::ProfileRepaired => write!(f, "outline was invalid and has been repaired"),
            SynthesisWarning::ProfileDropped { reason } => {
                write!(f, "outline could not be extruded: {reason}")
            }
            SynthesisWarning::PrimitiveSubstituted { kind } => {
                write!(f, "substituted {kind} primitive")
            }
            SynthesisWarning::Parameter { message } => f.write_str(message),
        }
    }
}

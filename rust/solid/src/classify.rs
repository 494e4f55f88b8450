// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-time classification of part names into primitive kinds

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Shaft,
    Gear,
    Bearing,
    Spacer,
    Bracket,
    MotorMount,
    Base,
    Joint,
    Link,
    EndEffector,
    Motor,
    Housing,
}

/// Name keywords per kind. The longest keyword found in a name wins, so
/// "motor_mount" is never read as "motor".
const KEYWORDS: &[(&str, PrimitiveKind)] = &[
    ("end_effector", PrimitiveKind::EndEffector),
    ("motor_mount", PrimitiveKind::MotorMount),
    ("actuator", PrimitiveKind::Motor),
    ("bearing", PrimitiveKind::Bearing),
    ("bracket", PrimitiveKind::Bracket),
    ("gripper", PrimitiveKind::EndEffector),
    ("housing", PrimitiveKind::Housing),
    ("spacer", PrimitiveKind::Spacer),
    ("stator", PrimitiveKind::Motor),
    ("joint", PrimitiveKind::Joint),
    ("motor", PrimitiveKind::Motor),
    ("mount", PrimitiveKind::MotorMount),
    ("rotor", PrimitiveKind::Motor),
    ("shaft", PrimitiveKind::Shaft),
    ("base", PrimitiveKind::Base),
    ("gear", PrimitiveKind::Gear),
    ("link", PrimitiveKind::Link),
    ("arm", PrimitiveKind::Link),
];

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::Shaft,
        PrimitiveKind::Gear,
        PrimitiveKind::Bearing,
        PrimitiveKind::Spacer,
        PrimitiveKind::Bracket,
        PrimitiveKind::MotorMount,
        PrimitiveKind::Base,
        PrimitiveKind::Joint,
        PrimitiveKind::Link,
        PrimitiveKind::EndEffector,
        PrimitiveKind::Motor,
        PrimitiveKind::Housing,
    ];

    /// Classify a free-form part name; spaces and dashes count as underscores
    pub fn classify(part_name: &str) -> Option<PrimitiveKind> {
        let name: String = part_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        KEYWORDS
            .iter()
            .filter(|(keyword, _)| name.contains(keyword))
            .max_by_key(|(keyword, _)| keyword.len())
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Shaft => "shaft",
            PrimitiveKind::Gear => "gear",
            PrimitiveKind::Bearing => "bearing",
            PrimitiveKind::Spacer => "spacer",
            PrimitiveKind::Bracket => "bracket",
            PrimitiveKind::MotorMount => "motor_mount",
            PrimitiveKind::Base => "base",
            PrimitiveKind::Joint => "joint",
            PrimitiveKind::Link => "link",
            PrimitiveKind::EndEffector => "end_effector",
            PrimitiveKind::Motor => "motor",
            PrimitiveKind::Housing => "housing",
        }
    }

    /// Raised features added on top of an extruded outline
    pub fn outline_feature(&self) -> OutlineFeature {
        match self {
            PrimitiveKind::Link | PrimitiveKind::Base => OutlineFeature::BossRings,
            PrimitiveKind::Joint => OutlineFeature::Collar,
            _ => OutlineFeature::None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineFeature {
    /// A ring around every hole
    BossRings,
    /// One collar around the first hole
    Collar,
    None,
}

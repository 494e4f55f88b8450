// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named-primitive dimensions
//!
//! Every size starts from a base value multiplied by one scale factor
//! derived from the arm reach, and can be overridden individually through
//! `intent.arm_dims.<key>`.

use serde_json::Value;
use sketchpart_model::params::value_as_f64;
use sketchpart_model::PartModel;

/// Reach giving a scale factor of exactly 1
pub const REFERENCE_REACH_MM: f64 = 300.0;
pub const MIN_SCALE: f64 = 0.6;
pub const MAX_SCALE: f64 = 1.4;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDims {
    pub scale: f64,
    pub link_length_mm: f64,
    pub link_width_mm: f64,
    pub link_hole_offset_mm: f64,
    pub joint_outer_diameter_mm: f64,
    pub joint_hole_diameter_mm: f64,
    pub gear_outer_diameter_mm: f64,
    pub gear_bore_diameter_mm: f64,
    pub shaft_diameter_mm: f64,
    pub shaft_length_mm: f64,
    pub bearing_outer_diameter_mm: f64,
    pub bearing_inner_diameter_mm: f64,
    pub motor_outer_diameter_mm: f64,
    pub motor_length_mm: f64,
    pub motor_mount_width_mm: f64,
    pub motor_mount_height_mm: f64,
    pub base_width_mm: f64,
    pub base_height_mm: f64,
}

/// clamp(reach / 300, 0.6, 1.4); a missing reach gives 1
pub fn reach_scale(reach_mm: Option<f64>) -> f64 {
    (reach_mm.unwrap_or(REFERENCE_REACH_MM) / REFERENCE_REACH_MM).clamp(MIN_SCALE, MAX_SCALE)
}

impl PrimitiveDims {
    pub fn from_model(model: &PartModel) -> Self {
        let scale = reach_scale(model.arm_reach_mm());
        Self::from_overrides(scale, model.intent.get("arm_dims"))
    }

    /// Base sizes at `scale`, replaced by positive numeric overrides
    pub fn from_overrides(scale: f64, overrides: Option<&Value>) -> Self {
        let pick = |key: &str, base: f64| {
            overrides
                .and_then(|o| o.get(key))
                .and_then(value_as_f64)
                .filter(|v| *v > 0.0)
                .unwrap_or(base * scale)
        };

        Self {
            scale,
            link_length_mm: pick("link_length_mm", 160.0),
            link_width_mm: pick("link_width_mm", 30.0),
            link_hole_offset_mm: pick("link_hole_offset_mm", 18.0),
            joint_outer_diameter_mm: pick("joint_outer_diameter_mm", 56.0),
            joint_hole_diameter_mm: pick("joint_hole_diameter_mm", 12.0),
            gear_outer_diameter_mm: pick("gear_outer_diameter_mm", 60.0),
            gear_bore_diameter_mm: pick("gear_bore_diameter_mm", 12.0),
            shaft_diameter_mm: pick("shaft_diameter_mm", 12.0),
            shaft_length_mm: pick("shaft_length_mm", 80.0),
            bearing_outer_diameter_mm: pick("bearing_outer_diameter_mm", 40.0),
            bearing_inner_diameter_mm: pick("bearing_inner_diameter_mm", 16.0),
            motor_outer_diameter_mm: pick("motor_outer_diameter_mm", 50.0),
            motor_length_mm: pick("motor_length_mm", 40.0),
            motor_mount_width_mm: pick("motor_mount_width_mm", 80.0),
            motor_mount_height_mm: pick("motor_mount_height_mm", 60.0),
            base_width_mm: pick("base_width_mm", 120.0),
            base_height_mm: pick("base_height_mm", 90.0),
        }
    }
}

impl Default for PrimitiveDims {
    fn default() -> Self {
        Self::from_overrides(1.0, None)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolution report and non-blocking warnings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the resolver had to assume or could not decide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ResolutionWarning {
    ScaleDefaulted,
    ThicknessUnresolved,
    HoleSizesVary { coefficient_of_variation: f64 },
    HoleDiameterUnresolved { count: usize },
    ConflictingHoleSpec { diameter_mm: f64, standard: String },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionWarning::ScaleDefaulted => {
                write!(f, "Scale not provided; px_to_mm assumed as 1.0")
            }
            ResolutionWarning::ThicknessUnresolved => {
                write!(f, "Thickness unresolved; 5 mm assumed for drawing and solid")
            }
            ResolutionWarning::HoleSizesVary {
                coefficient_of_variation,
            } => write!(
                f,
                "Detected hole sizes vary (cv={coefficient_of_variation:.3}); set unify_holes to decide"
            ),
            ResolutionWarning::HoleDiameterUnresolved { .. } => {
                write!(f, "Hole diameter unresolved")
            }
            ResolutionWarning::ConflictingHoleSpec {
                diameter_mm,
                standard,
            } => write!(
                f,
                "Both hole_diameter_mm={diameter_mm} and hole_standard={standard} given; diameter used"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisionConfidence {
    pub holes_avg: Option<f64>,
    pub bend_lines_avg: Option<f64>,
}

/// Summary of one resolution pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub scale_px_to_mm: f64,
    pub hole_standard: String,
    pub hole_diameters_mm: Vec<Option<f64>>,
    pub vision_confidence: VisionConfidence,
    pub decisions: Vec<String>,
    pub notes: Vec<String>,
    pub warnings: Vec<ResolutionWarning>,
}

impl ResolutionReport {
    /// Record a warning together with its human-readable note
    pub fn warn(&mut self, warning: ResolutionWarning) {
        tracing::warn!(%warning, "resolution warning");
        self.notes.push(warning.to_string());
        self.warnings.push(warning);
    }

    pub fn decide(&mut self, decision: impl Into<String>) {
        self.decisions.push(decision.into());
    }

    pub fn has_decision(&self, decision: &str) -> bool {
        self.decisions.iter().any(|d| d == decision)
    }
}

/// Mean rounded to three decimals, `None` for no values
pub fn mean3(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| crate::round3(sum / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_warning_serialization() {
        let w = ResolutionWarning::HoleSizesVary {
            coefficient_of_variation: 0.2,
        };
        assert_eq!(
            serde_json::to_value(&w).unwrap(),
            json!({"code": "hole_sizes_vary", "coefficient_of_variation": 0.2})
        );
        assert_eq!(
            serde_json::to_value(ResolutionWarning::ScaleDefaulted).unwrap(),
            json!({"code": "scale_defaulted"})
        );
    }

    #[test]
    fn test_warn_adds_note() {
        let mut report = ResolutionReport::default();
        report.warn(ResolutionWarning::ScaleDefaulted);
        assert_eq!(report.notes, vec!["Scale not provided; px_to_mm assumed as 1.0"]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_mean3() {
        assert_eq!(mean3([0.9, 0.8, 0.7]), Some(0.8));
        assert_eq!(mean3(std::iter::empty()), None);
    }
}

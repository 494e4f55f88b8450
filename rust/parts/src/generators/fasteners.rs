// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metric fasteners: bolts, nuts, washers and spacers
//!
//! Threads are not modelled. Bolts stand head-down on z = 0 with the shank
//! pointing up.

use super::{combine, disc, extrude, Args, GeneratorRegistry};
use crate::catalog::GeneratorBinding;
use crate::error::{GeneratorError, GeneratorResult};
use sketchpart_geometry::primitives::{cylinder, tube};
use sketchpart_geometry::profile::{
    circle_contour, create_rectangle, hexagon_across_flats, regular_polygon,
};
use sketchpart_geometry::{subtract_or_keep, Mesh, Point2, Profile2D, SynthesisWarning, Vector3};
use sketchpart_model::ParameterMap;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register(GeneratorBinding::new("fasteners", "bolt"), bolt);
    registry.register(GeneratorBinding::new("fasteners", "nut"), nut);
    registry.register(GeneratorBinding::new("fasteners", "washer"), washer);
    registry.register(GeneratorBinding::new("fasteners", "spacer"), spacer);
}

/// Approximate ISO dimensions for one metric size, in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastenerDims {
    pub pitch: f64,
    /// Hex head across flats
    pub head_dia: f64,
    pub head_height: f64,
    /// Nut across flats
    pub nut_flat: f64,
    pub nut_height: f64,
}

const fn dims(pitch: f64, head_dia: f64, head_height: f64, nut_flat: f64, nut_height: f64) -> FastenerDims {
    FastenerDims {
        pitch,
        head_dia,
        head_height,
        nut_flat,
        nut_height,
    }
}

pub const METRIC_FASTENERS: [(&str, FastenerDims); 7] = [
    ("M3", dims(0.5, 5.5, 2.0, 5.5, 2.4)),
    ("M4", dims(0.7, 7.0, 2.8, 7.0, 3.2)),
    ("M5", dims(0.8, 8.5, 3.5, 8.0, 4.0)),
    ("M6", dims(1.0, 10.0, 4.0, 10.0, 5.0)),
    ("M8", dims(1.25, 13.0, 5.3, 13.0, 6.5)),
    ("M10", dims(1.5, 16.0, 6.4, 17.0, 8.0)),
    ("M12", dims(1.75, 18.0, 7.5, 19.0, 10.0)),
];

const FALLBACK_SIZE: &str = "M5";

/// Table lookup, case-insensitive
pub fn metric_dims(size: &str) -> Option<FastenerDims> {
    let size = size.trim().to_ascii_uppercase();
    METRIC_FASTENERS
        .iter()
        .find(|(name, _)| *name == size)
        .map(|(_, d)| *d)
}

/// Nominal diameter from a designation such as "M5" or "m8"
pub fn nominal_diameter(size: &str) -> Option<f64> {
    let size = size.trim();
    let digits = size.strip_prefix(['M', 'm']).unwrap_or(size);
    digits.parse::<f64>().ok().filter(|d| *d > 0.0 && d.is_finite())
}

/// Size designation resolved to a diameter and table row.
///
/// Sizes missing from the table borrow the M5 row; the nominal diameter is
/// still taken from the designation.
fn resolve_size(size: &str, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<(f64, FastenerDims)> {
    let nominal = nominal_diameter(size)
        .ok_or_else(|| GeneratorError::invalid("size", format!("cannot read a diameter from {size:?}")))?;
    let table = match metric_dims(size) {
        Some(d) => d,
        None => {
            warnings.push(SynthesisWarning::parameter(format!(
                "size {size} is not tabulated, using {FALLBACK_SIZE} head and nut dimensions"
            )));
            metric_dims(FALLBACK_SIZE).ok_or_else(|| GeneratorError::invalid("size", "fastener table is empty"))?
        }
    };
    Ok((nominal, table))
}

pub fn bolt(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let size = args.text("size", FALLBACK_SIZE);
    let length = args.positive("length_mm", 20.0)?;
    let head_type = args.text("head_type", "hex");
    let (d, table) = resolve_size(size, warnings)?;

    if let Some(thread) = args.opt_f64("thread_length_mm").filter(|t| *t > length) {
        warnings.push(SynthesisWarning::parameter(format!(
            "thread_length_mm {thread} exceeds length_mm {length}"
        )));
    }

    let (head, head_height) = match head_type {
        "hex" => {
            let profile = Profile2D::new(hexagon_across_flats(table.head_dia));
            (extrude(&profile, 0.0, table.head_height)?, table.head_height)
        }
        "socket" => {
            let head_height = d;
            let head = cylinder(d * 1.5 / 2.0, head_height, 64);
            let socket_depth = head_height * 0.6;
            // Hex key socket, carried past the top face so the cut is clean
            let socket_profile = Profile2D::new(regular_polygon(d * 0.9 / 2.0, 6, 0.0));
            let socket = extrude(&socket_profile, head_height - socket_depth, socket_depth + 1.0)?;
            let head = subtract_or_keep(&head, &socket, "hex socket").into_mesh_noting(warnings);
            (head, head_height)
        }
        // Pan head for "pan" and anything unrecognised
        _ => (cylinder(d, d * 0.6, 64), d * 0.6),
    };

    let mut shank = cylinder(d / 2.0, length, 32);
    shank.translate(Vector3::new(0.0, 0.0, head_height));
    combine(vec![head, shank])
}

pub fn nut(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let size = args.text("size", FALLBACK_SIZE);
    let nut_type = args.text("nut_type", "hex");
    let nyloc = args.flag("nyloc", false);
    let (d, table) = resolve_size(size, warnings)?;

    let height = if nyloc { table.nut_height * 1.3 } else { table.nut_height };
    let outline = match nut_type {
        "square" => create_rectangle(table.nut_flat, table.nut_flat).outer,
        _ => hexagon_across_flats(table.nut_flat),
    };
    let mut profile = Profile2D::new(outline);
    profile.add_hole(circle_contour(Point2::origin(), d / 2.0, 32));
    let mut parts = vec![extrude(&profile, 0.0, height)?];

    if nut_type == "flange" {
        let flange = disc(table.nut_flat * 1.4 / 2.0, d / 2.0, 64);
        parts.push(extrude(&flange, 0.0, height * 0.2)?);
    }
    combine(parts)
}

pub fn washer(params: &ParameterMap, warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let size = args.text("size", FALLBACK_SIZE);
    let washer_type = args.text("washer_type", "flat");
    let d = nominal_diameter(size)
        .ok_or_else(|| GeneratorError::invalid("size", format!("cannot read a diameter from {size:?}")))?;
    if metric_dims(size).is_none() {
        warnings.push(SynthesisWarning::parameter(format!("size {size} is not tabulated")));
    }

    let inner = d + 0.3;
    let (outer, thickness) = match washer_type {
        "spring" | "lock" => (d * 2.0, d * 0.25),
        _ => (d * 2.2, d * 0.2),
    };
    Ok(tube(outer / 2.0, inner / 2.0, thickness, 64))
}

pub fn spacer(params: &ParameterMap, _warnings: &mut Vec<SynthesisWarning>) -> GeneratorResult<Mesh> {
    let args = Args(params);
    let outer = args.positive("outer_diameter_mm", 10.0)?;
    let inner = args.non_negative("inner_diameter_mm", 5.0);
    let length = args.positive("length_mm", 5.0)?;
    Ok(tube(outer / 2.0, inner / 2.0, length, 64))
}

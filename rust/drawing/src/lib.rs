// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawings of part models
//!
//! [`DrawingSynthesizer`] lays a [`PartModel`] out as a third-angle sheet
//! (Top above Front, Right beside Front) on a fixed set of layers.
//! [`write_dxf`] serializes the sheet; [`render_preview`] rasterizes the plan
//! view on its own scale.

pub mod dxf_writer;
pub mod error;
pub mod layout;
pub mod preview;
pub mod sheet;
pub mod synth;

pub use dxf_writer::{to_dxf, write_dxf};
pub use error::{DrawingError, Result};
pub use layout::ViewLayout;
pub use preview::{render_preview, save_preview, PreviewBounds};
pub use sheet::{DrawingSheet, Entity, Layer, LineStyle, Shape};
pub use synth::{annotation_lines, DrawingSynthesizer};

use sketchpart_model::PartModel;
use std::path::Path;

/// Write both the DXF drawing and the PNG preview for a model
pub fn write_drawings(
    model: &PartModel,
    dxf_path: impl AsRef<Path>,
    png_path: impl AsRef<Path>,
) -> Result<DrawingSheet> {
    let sheet = DrawingSynthesizer.synthesize(model);
    write_dxf(&sheet, dxf_path.as_ref())?;
    save_preview(model, png_path.as_ref())?;
    tracing::info!(
        part = %model.part,
        dxf = %dxf_path.as_ref().display(),
        png = %png_path.as_ref().display(),
        "drawings written"
    );
    Ok(sheet)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketch runs: image to features, model, drawing and solid
//!
//! A run directory holds every artifact of one sketch:
//!
//! | file | content |
//! |---|---|
//! | `vision.json` | canonical features in pixels |
//! | `part_model.json` | millimeter part model |
//! | `report.json` | resolution report |
//! | `drawing.dxf`, `drawing.png` | multi-view drawing and preview |
//! | `model.stl`, `solid.json` | solid and how it was built |

use anyhow::{Context, Result};
use sketchpart_drawing::write_drawings;
use sketchpart_model::{write_json_atomic, ModelAssembler, ParameterMap, PartModel, PartModelPatch};
use sketchpart_solid::{write_solid, SolidReport};
use sketchpart_vision::{FeatureExtractor, FeatureNormalizer};
use std::path::Path;
use tracing::{info, warn};

pub const VISION_FILE: &str = "vision.json";
pub const MODEL_FILE: &str = "part_model.json";
pub const REPORT_FILE: &str = "report.json";
pub const DXF_FILE: &str = "drawing.dxf";
pub const PREVIEW_FILE: &str = "drawing.png";
pub const SOLID_FILE: &str = "model.stl";
pub const SOLID_REPORT_FILE: &str = "solid.json";

/// Run the whole pipeline on `image` into `run_dir`
pub fn run(image: &Path, params: &ParameterMap, run_dir: &Path) -> Result<PartModel> {
    std::fs::create_dir_all(run_dir).with_context(|| format!("creating run directory {}", run_dir.display()))?;

    let raw = FeatureExtractor::default()
        .extract_path(image)
        .with_context(|| format!("extracting features from {}", image.display()))?;
    let features = FeatureNormalizer.normalize_raw(&raw);
    if features.is_empty() {
        warn!(image = %image.display(), "no geometry found in sketch");
    }
    write_json_atomic(run_dir.join(VISION_FILE), &features).context("writing features")?;

    let image_ref = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.display().to_string());
    let resolution = ModelAssembler.assemble(&features, params, &image_ref);
    resolution.model.save(run_dir.join(MODEL_FILE)).context("writing part model")?;
    write_json_atomic(run_dir.join(REPORT_FILE), &resolution.report).context("writing report")?;

    render(&resolution.model, run_dir)?;
    info!(
        run_dir = %run_dir.display(),
        holes = resolution.model.geometry.holes.len(),
        warnings = resolution.report.warnings.len(),
        "run complete"
    );
    Ok(resolution.model)
}

/// Apply a patch to a run's model and regenerate its drawing and solid
pub fn patch(run_dir: &Path, patch_file: &Path) -> Result<PartModel> {
    let model_path = run_dir.join(MODEL_FILE);
    let model = PartModel::load(&model_path).with_context(|| format!("loading {}", model_path.display()))?;
    let patch = PartModelPatch::load(patch_file).with_context(|| format!("reading patch {}", patch_file.display()))?;
    if patch.is_empty() {
        warn!(patch = %patch_file.display(), "patch changes nothing");
    }

    let next = model.apply_patch(&patch);
    next.save(&model_path).context("writing patched part model")?;
    render(&next, run_dir)?;
    info!(run_dir = %run_dir.display(), "patch applied");
    Ok(next)
}

/// Drawing, preview and solid for a model
fn render(model: &PartModel, run_dir: &Path) -> Result<SolidReport> {
    write_drawings(model, run_dir.join(DXF_FILE), run_dir.join(PREVIEW_FILE)).context("writing drawings")?;
    let report = write_solid(model, run_dir.join(SOLID_FILE)).context("writing solid")?;
    for w in &report.warnings {
        warn!(part = %model.part, warning = %w, "solid degraded");
    }
    write_json_atomic(run_dir.join(SOLID_REPORT_FILE), &report).context("writing solid report")?;
    Ok(report)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Standard-part commands: generate, assemble, catalog

use anyhow::{Context, Result};
use serde::Serialize;
use sketchpart_geometry::stl::write_stl;
use sketchpart_model::{write_json_atomic, ParameterMap};
use sketchpart_parts::{check_quantity, AssemblyComposer, PartCatalog, PartFactory};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SELECTION_FILE: &str = "selection.json";
pub const ASSEMBLY_FILE: &str = "assembly.stl";

/// What `generate` built, written next to the meshes
#[derive(Debug, Serialize)]
pub struct Selection {
    pub part_id: String,
    pub scale: f64,
    pub quantity: usize,
    pub parameters: ParameterMap,
    pub size_mm: Option<[f64; 3]>,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Generate `quantity` copies of one part into `out_dir`.
///
/// Copies go to `<part_id>_<n>.stl`; more than one copy also produces a
/// side-by-side `assembly.stl`. Quantities above
/// [`sketchpart_parts::MAX_QUANTITY`] are refused before anything is built.
pub fn generate(
    catalog: &PartCatalog,
    part_id: &str,
    params: &ParameterMap,
    scale: f64,
    quantity: usize,
    out_dir: &Path,
    spacing_mm: f64,
) -> Result<Selection> {
    check_quantity(part_id, quantity)?;
    let generated = PartFactory::new(catalog).generate(part_id, params, scale)?;
    for w in &generated.warnings {
        warn!(part_id, warning = %w, "generation warning");
    }

    let mut files = Vec::with_capacity(quantity);
    for n in 1..=quantity {
        let path = out_dir.join(format!("{part_id}_{n}.stl"));
        write_stl(&generated.mesh, &path).with_context(|| format!("writing {}", path.display()))?;
        files.push(path);
    }

    if quantity > 1 {
        let copies = (1..=quantity).map(|n| (format!("{part_id}_{n}"), &generated.mesh));
        if let Some(assembly) = AssemblyComposer::new(spacing_mm).compose(copies) {
            let path = out_dir.join(ASSEMBLY_FILE);
            write_stl(&assembly.mesh, &path).with_context(|| format!("writing {}", path.display()))?;
            files.push(path);
        }
    }

    let selection = Selection {
        part_id: part_id.to_string(),
        scale,
        quantity,
        size_mm: generated.bounds.map(|b| {
            let s = b.size();
            [s.x, s.y, s.z].map(sketchpart_model::round3)
        }),
        parameters: generated.parameters_used,
        files,
        warnings: generated.warnings.iter().map(ToString::to_string).collect(),
    };
    write_json_atomic(out_dir.join(SELECTION_FILE), &selection).context("writing selection")?;
    info!(part_id, quantity, out_dir = %out_dir.display(), "part generated");
    Ok(selection)
}

/// Lay STL files out side by side into `out`.
///
/// Returns `false` when none of the inputs could be used.
pub fn assemble(inputs: &[PathBuf], out: &Path, spacing_mm: f64) -> Result<bool> {
    let Some(assembly) = AssemblyComposer::new(spacing_mm).compose_files(inputs) else {
        warn!(inputs = inputs.len(), "nothing to assemble");
        return Ok(false);
    };
    write_stl(&assembly.mesh, out).with_context(|| format!("writing {}", out.display()))?;
    info!(
        components = assembly.placements.len(),
        skipped = inputs.len() - assembly.placements.len(),
        out = %out.display(),
        "assembly written"
    );
    Ok(true)
}

/// Catalog listing, optionally restricted to one category
pub fn catalog_listing(catalog: &PartCatalog, category: Option<&str>, lang: &str) -> String {
    match category {
        None => catalog.summary(lang),
        Some(category) => catalog
            .by_category(category)
            .iter()
            .map(|part| format!("{}\t{}", part.id, part.display_name(lang)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

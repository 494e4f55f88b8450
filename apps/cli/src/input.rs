// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter files, `--set` pairs, catalogs and run ids

use anyhow::{bail, Context, Result};
use chrono::Local;
use serde_json::Value;
use sketchpart_model::ParameterMap;
use sketchpart_parts::PartCatalog;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Merge an optional JSON parameter file with `key=value` overrides
pub fn load_parameters(file: Option<&Path>, assignments: &[String]) -> Result<ParameterMap> {
    let mut params = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading parameters from {}", path.display()))?;
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing parameters in {}", path.display()))?;
            if !value.is_object() {
                bail!("{} must contain a JSON object", path.display());
            }
            ParameterMap::from_value(value)
        }
        None => ParameterMap::new(),
    };

    for pair in assignments {
        let Some((key, value)) = ParameterMap::parse_assignment(pair) else {
            bail!("invalid --set '{pair}', expected key=value");
        };
        params.insert(key, value);
    }
    Ok(params)
}

/// Built-in catalog, or the one at `path` (a JSON array file or a directory)
pub fn load_catalog(path: Option<&Path>) -> Result<PartCatalog> {
    let Some(path) = path else {
        return Ok(PartCatalog::standard());
    };
    let catalog = if path.is_dir() {
        PartCatalog::load_dir(path)?
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        PartCatalog::from_json_str(&text).with_context(|| format!("parsing catalog {}", path.display()))?
    };
    info!(path = %path.display(), parts = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// `YYYYMMDD_HHMMSS_xxxxxx`
pub fn new_run_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), &suffix[..6])
}

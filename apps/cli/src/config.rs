// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration loaded from environment variables.

use sketchpart_parts::DEFAULT_SPACING_MM;
use std::path::PathBuf;

/// CLI configuration. Command-line flags override these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory that holds one sub-directory per run.
    pub output_root: PathBuf,
    /// Catalog JSON file or directory replacing the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// Gap between assembled components.
    pub assembly_spacing_mm: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            output_root: non_empty("SKETCHPART_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./output")),
            catalog_path: non_empty("SKETCHPART_CATALOG").map(PathBuf::from),
            assembly_spacing_mm: non_empty("SKETCHPART_ASSEMBLY_SPACING_MM")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(DEFAULT_SPACING_MM),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_root, PathBuf::from("./output"));
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.assembly_spacing_mm, 20.0);
    }

    #[test]
    fn test_environment_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SKETCHPART_OUTPUT_ROOT", "/tmp/runs"),
            ("SKETCHPART_CATALOG", " parts.json "),
            ("SKETCHPART_ASSEMBLY_SPACING_MM", "5.5"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.output_root, PathBuf::from("/tmp/runs"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("parts.json")));
        assert_eq!(config.assembly_spacing_mm, 5.5);
    }

    #[test]
    fn test_bad_spacing_falls_back() {
        let config = Config::from_lookup(|k| (k == "SKETCHPART_ASSEMBLY_SPACING_MM").then(|| "-3".to_string()));
        assert_eq!(config.assembly_spacing_mm, 20.0);
    }
}

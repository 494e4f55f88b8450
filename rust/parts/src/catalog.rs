// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Part catalog
//!
//! Definitions are plain JSON documents: an id, a category, localized names,
//! search keywords, a parameter schema, expression constraints and the
//! generator the part is bound to. A catalog is an ordinary value built by
//! the caller, either from the built-in set or from a directory of files.

use crate::error::{PartsError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, warn};

const STANDARD_CATALOG: &str = include_str!("../catalog/standard.json");
const SUMMARY_CONTEXT_CHARS: usize = 100;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Int,
    #[default]
    Float,
    Bool,
    #[serde(rename = "string")]
    Text,
    /// Anything else is passed through untouched
    #[serde(other)]
    Any,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Text => "string",
            ParamType::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: BTreeMap<String, String>,
}

impl ParameterSpec {
    /// Length parameters follow the generation scale factor
    pub fn is_length(&self) -> bool {
        matches!(self.unit.as_str(), "mm" | "m" | "cm" | "inch")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Which registered generator builds a part
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratorBinding {
    pub module: String,
    pub function: String,
}

impl GeneratorBinding {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    /// Registry key, `module.function`
    pub fn key(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Free-text usage notes for part selection
    #[serde(default, rename = "ai_context")]
    pub context: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    pub generator: GeneratorBinding,
    #[serde(default)]
    pub compatible_with: Vec<String>,
    #[serde(default)]
    pub assembly_hints: serde_json::Map<String, Value>,
}

impl PartDefinition {
    /// Name in `lang`, else English, else the id
    pub fn display_name(&self, lang: &str) -> &str {
        localized(&self.name, lang).unwrap_or(&self.id)
    }

    /// Description in `lang`, else English, else empty
    pub fn display_description(&self, lang: &str) -> &str {
        localized(&self.description, lang).unwrap_or("")
    }
}

fn localized<'a>(texts: &'a BTreeMap<String, String>, lang: &str) -> Option<&'a str> {
    texts
        .get(lang)
        .filter(|s| !s.is_empty())
        .or_else(|| texts.get("en").filter(|s| !s.is_empty()))
        .map(String::as_str)
}

/// Indexed set of part definitions
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: Vec<PartDefinition>,
    by_id: FxHashMap<String, usize>,
    keyword_index: FxHashMap<String, Vec<usize>>,
    category_index: FxHashMap<String, Vec<usize>>,
}

impl PartCatalog {
    /// Build from definitions; a repeated id replaces the earlier definition
    pub fn from_definitions(definitions: impl IntoIterator<Item = PartDefinition>) -> Self {
        let mut catalog = Self::default();
        for definition in definitions {
            match catalog.by_id.get(&definition.id) {
                Some(&index) => catalog.parts[index] = definition,
                None => {
                    catalog.by_id.insert(definition.id.clone(), catalog.parts.len());
                    catalog.parts.push(definition);
                }
            }
        }
        catalog.build_indices();
        catalog
    }

    /// Parse a JSON array of definitions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let definitions: Vec<PartDefinition> = serde_json::from_str(json)?;
        Ok(Self::from_definitions(definitions))
    }

    /// The built-in definitions for every bundled generator
    pub fn standard() -> Self {
        Self::from_json_str(STANDARD_CATALOG).unwrap_or_else(|e| {
            error!(error = %e, "built-in catalog is malformed");
            Self::default()
        })
    }

    /// Load `<dir>/<category>/*.json`, one definition per file.
    ///
    /// Directories starting with `_` are skipped, as are files that do not
    /// parse. A missing directory yields an empty catalog.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Self::default());
        }
        if !dir.is_dir() {
            return Err(PartsError::Catalog(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut category_dirs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |n| n.starts_with('_'));
            if path.is_dir() && !skipped {
                category_dirs.push(path);
            }
        }
        category_dirs.sort();

        let mut definitions = Vec::new();
        for category_dir in category_dirs {
            let mut files: Vec<_> = std::fs::read_dir(&category_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();

            for file in files {
                let parsed = std::fs::read_to_string(&file)
                    .map_err(PartsError::from)
                    .and_then(|text| Ok(serde_json::from_str::<PartDefinition>(&text)?));
                match parsed {
                    Ok(definition) => definitions.push(definition),
                    Err(e) => warn!(path = %file.display(), error = %e, "skipping part definition"),
                }
            }
        }

        let catalog = Self::from_definitions(definitions);
        debug!(parts = catalog.len(), dir = %dir.display(), "catalog loaded");
        Ok(catalog)
    }

    fn build_indices(&mut self) {
        self.keyword_index.clear();
        self.category_index.clear();
        for (index, part) in self.parts.iter().enumerate() {
            for keyword in &part.keywords {
                let entry = self.keyword_index.entry(keyword.to_lowercase()).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
            self.category_index
                .entry(part.category.clone())
                .or_default()
                .push(index);
        }
    }

    pub fn get(&self, part_id: &str) -> Option<&PartDefinition> {
        self.by_id.get(part_id).map(|&i| &self.parts[i])
    }

    /// Parts matching any of the keywords, case-insensitively, in catalog order
    pub fn search_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<&PartDefinition> {
        let mut hits: Vec<usize> = keywords
            .iter()
            .filter_map(|kw| self.keyword_index.get(&kw.as_ref().to_lowercase()))
            .flatten()
            .copied()
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter().map(|i| &self.parts[i]).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&PartDefinition> {
        self.category_index
            .get(category)
            .map(|ids| ids.iter().map(|&i| &self.parts[i]).collect())
            .unwrap_or_default()
    }

    /// Category names, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.category_index.keys().map(String::as_str).collect();
        categories.sort_unstable();
        categories
    }

    pub fn all_parts(&self) -> &[PartDefinition] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Plain-text listing grouped by category, for prompts and `catalog` output
    pub fn summary(&self, lang: &str) -> String {
        let mut lines = vec!["Available Parts Library:\n".to_string()];
        for category in self.categories() {
            lines.push(format!("\n## {}", title_case(category)));
            for part in self.by_category(category) {
                lines.push(format!("- {}: {}", part.id, part.display_name(lang)));
                if !part.context.is_empty() {
                    let mut context: String = part.context.chars().take(SUMMARY_CONTEXT_CHARS).collect();
                    if part.context.chars().count() > SUMMARY_CONTEXT_CHARS {
                        context.push_str("...");
                    }
                    lines.push(format!("  Context: {context}"));
                }
            }
        }
        lines.join("\n")
    }
}

/// Capitalize the first letter of each word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(id: &str, category: &str, keywords: &[&str]) -> PartDefinition {
        serde_json::from_value(json!({
            "id": id,
            "category": category,
            "name": {"en": format!("{id} en"), "ja": format!("{id} ja")},
            "keywords": keywords,
            "generator": {"module": category, "function": id}
        }))
        .unwrap()
    }

    #[test]
    fn test_standard_catalog_has_every_generator() {
        let catalog = PartCatalog::standard();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.categories(), vec!["drive", "fasteners", "gears", "structural"]);
        assert_eq!(catalog.by_category("gears").len(), 4);
        assert_eq!(catalog.by_category("fasteners").len(), 4);
        assert_eq!(catalog.by_category("structural").len(), 3);
        assert_eq!(catalog.by_category("drive").len(), 4);

        let bolt = catalog.get("bolt").unwrap();
        assert_eq!(bolt.generator.key(), "fasteners.bolt");
        assert_eq!(bolt.parameters["size"].kind, ParamType::Text);
        assert!(bolt.parameters["length_mm"].is_length());
        assert!(!bolt.parameters["size"].is_length());
    }

    #[test]
    fn test_keyword_search_is_case_insensitive_union() {
        let catalog = PartCatalog::from_definitions([
            definition("spur_gear", "gears", &["Gear", "spur"]),
            definition("rack", "gears", &["rack", "linear"]),
            definition("bolt", "fasteners", &["bolt"]),
        ]);
        let ids: Vec<&str> = catalog
            .search_keywords(&["GEAR", "linear", "missing"])
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["spur_gear", "rack"]);
        assert!(catalog.search_keywords(&["nothing"]).is_empty());
    }

    #[test]
    fn test_localized_names_fall_back() {
        let mut part = definition("nut", "fasteners", &[]);
        assert_eq!(part.display_name("ja"), "nut ja");
        assert_eq!(part.display_name("de"), "nut en");
        part.name.clear();
        assert_eq!(part.display_name("ja"), "nut");
        assert_eq!(part.display_description("ja"), "");
    }

    #[test]
    fn test_repeated_id_replaces() {
        let mut second = definition("plate", "structural", &["panel"]);
        second.context = "second".to_string();
        let catalog = PartCatalog::from_definitions([definition("plate", "structural", &["plate"]), second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("plate").unwrap().context, "second");
        assert!(catalog.search_keywords(&["plate"]).is_empty());
        assert_eq!(catalog.search_keywords(&["panel"]).len(), 1);
    }

    #[test]
    fn test_summary_layout() {
        let mut gear = definition("spur_gear", "gears", &[]);
        gear.context = "x".repeat(120);
        let catalog = PartCatalog::from_definitions([gear, definition("bolt", "fasteners", &[])]);
        let summary = catalog.summary("en");
        let expected_context = format!("  Context: {}...", "x".repeat(100));
        assert!(summary.starts_with("Available Parts Library:\n\n\n## Fasteners\n- bolt: bolt en"));
        assert!(summary.contains("## Gears\n- spur_gear: spur_gear en\n"));
        assert!(summary.ends_with(&expected_context));
    }

    #[test]
    fn test_load_dir_skips_private_and_broken() {
        let dir = tempfile::tempdir().unwrap();
        let gears = dir.path().join("gears");
        let private = dir.path().join("_drafts");
        std::fs::create_dir_all(&gears).unwrap();
        std::fs::create_dir_all(&private).unwrap();
        std::fs::write(
            gears.join("spur.json"),
            serde_json::to_string(&definition("spur_gear", "gears", &["gear"])).unwrap(),
        )
        .unwrap();
        std::fs::write(gears.join("broken.json"), "{ not json").unwrap();
        std::fs::write(gears.join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            private.join("draft.json"),
            serde_json::to_string(&definition("draft", "gears", &[])).unwrap(),
        )
        .unwrap();

        let catalog = PartCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("spur_gear").is_some());
        assert!(catalog.get("draft").is_none());

        let missing = PartCatalog::load_dir(dir.path().join("nope")).unwrap();
        assert!(missing.is_empty());
    }
}

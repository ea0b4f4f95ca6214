//! The mapping table: static Java → Bedrock path correspondences
//!
//! A table is parsed and validated once, then shared read-only by every run.
//! The default table is compiled into the binary.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use super::pattern::{SourcePattern, max_template_capture};
use super::types::{MappingEntry, ResolvedTarget};
use crate::error::{Error, Result};
use crate::manifest::min_engine_version;

/// Built-in table JSON
const BUILTIN_TABLE_JSON: &str = include_str!("../../data/java_to_bedrock.json");

/// Table document as stored on disk
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    schema_version: u32,
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
    entries: Vec<MappingEntry>,
}

/// Immutable, validated mapping table
#[derive(Debug)]
pub struct MappingTable {
    schema_version: u32,
    entries: Vec<MappingEntry>,
    /// Exact source path → entry index
    exact: HashMap<String, usize>,
    /// Patterns in declared order, with their entry index
    patterns: Vec<(SourcePattern, usize)>,
}

impl MappingTable {
    /// Parse and validate a table document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: TableDocument = serde_json::from_str(json)
            .map_err(|e| Error::invalid_table(format!("malformed table document: {e}")))?;
        Self::from_entries(document.schema_version, document.entries)
    }

    /// Build a table from entries already in memory
    pub fn from_entries(schema_version: u32, entries: Vec<MappingEntry>) -> Result<Self> {
        if min_engine_version(schema_version).is_none() {
            return Err(Error::invalid_table(format!(
                "unknown schema version {schema_version}"
            )));
        }
        if entries.is_empty() {
            return Err(Error::invalid_table("table has no entries"));
        }

        let mut exact = HashMap::new();
        let mut patterns = Vec::new();
        let mut seen_sources = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if entry.source.is_empty() {
                return Err(Error::invalid_table(format!("entry {index} has an empty source")));
            }
            if let Some(first) = seen_sources.insert(entry.source.as_str(), index) {
                return Err(Error::invalid_table(format!(
                    "source {:?} declared twice (entries {first} and {index})",
                    entry.source
                )));
            }
            if entry.targets.is_empty() {
                return Err(Error::invalid_table(format!(
                    "source {:?} has no targets",
                    entry.source
                )));
            }
            if let Some(empty) = entry.targets.iter().find(|t| t.is_empty()) {
                return Err(Error::invalid_table(format!(
                    "source {:?} has an empty target {empty:?}",
                    entry.source
                )));
            }

            let captures = if entry.is_pattern() {
                let pattern = SourcePattern::compile(&entry.source)?;
                let captures = pattern.captures();
                patterns.push((pattern, index));
                captures
            } else {
                exact.insert(entry.source.clone(), index);
                0
            };

            for target in &entry.targets {
                let wanted = max_template_capture(target)?;
                if wanted > captures {
                    return Err(Error::invalid_table(format!(
                        "target {target:?} of {:?} uses capture {wanted} but the source has {captures}",
                        entry.source
                    )));
                }
            }
        }

        Ok(Self {
            schema_version,
            entries,
            exact,
            patterns,
        })
    }

    /// The compiled-in default table, parsed on first use
    ///
    /// # Panics
    /// Panics if the embedded table is malformed. This would indicate a
    /// build-time error and should never occur in a properly built binary.
    pub fn builtin() -> &'static MappingTable {
        static TABLE: OnceLock<MappingTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            MappingTable::from_json_str(BUILTIN_TABLE_JSON)
                .expect("Embedded mapping table should be valid")
        })
    }

    /// Schema version the table declares
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a normalized path: exact match first, then the first matching pattern
    #[must_use]
    pub fn lookup(&self, path: &str) -> Vec<ResolvedTarget> {
        if let Some(&index) = self.exact.get(path) {
            let entry = &self.entries[index];
            return entry
                .targets
                .iter()
                .map(|target| ResolvedTarget {
                    target_path: target.clone(),
                    kind: entry.kind,
                    hint: entry.hint,
                })
                .collect();
        }

        for (pattern, index) in &self.patterns {
            let entry = &self.entries[*index];
            if let Some(targets) = pattern.expand(path, &entry.targets) {
                return targets
                    .into_iter()
                    .map(|target_path| ResolvedTarget {
                        target_path,
                        kind: entry.kind,
                        hint: entry.hint,
                    })
                    .collect();
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{AssetKind, TransformHint};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_table_loads() {
        let table = MappingTable::builtin();
        assert!(!table.is_empty());
        assert!(min_engine_version(table.schema_version()).is_some());
    }

    #[test]
    fn test_builtin_table_cached() {
        let t1 = MappingTable::builtin();
        let t2 = MappingTable::builtin();
        assert!(std::ptr::eq(t1, t2));
    }

    #[test]
    fn test_builtin_renames_modern_block() {
        let table = MappingTable::builtin();
        let targets = table.lookup("assets/minecraft/textures/block/oak_planks.png");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].target_path, "textures/blocks/planks_oak.png");
        assert_eq!(targets[0].kind, AssetKind::BlockTexture);

        let generic = table.lookup("assets/minecraft/textures/block/stone.png");
        assert_eq!(generic[0].target_path, "textures/blocks/stone.png");
    }

    #[test]
    fn test_builtin_pack_icon() {
        let targets = MappingTable::builtin().lookup("pack.png");
        assert_eq!(targets[0].target_path, "pack_icon.png");
        assert_eq!(targets[0].kind, AssetKind::UiTexture);
    }

    #[test]
    fn test_exact_wins_over_earlier_pattern() {
        let table = MappingTable::from_json_str(
            r#"{
                "schema_version": 2,
                "entries": [
                    {"source": "a/*.png", "targets": ["pattern/${1}.png"], "kind": "block-texture"},
                    {"source": "a/special.png", "targets": ["exact.png"], "kind": "ui-texture", "hint": "opaque"}
                ]
            }"#,
        )
        .unwrap();

        let exact = table.lookup("a/special.png");
        assert_eq!(exact[0].target_path, "exact.png");
        assert_eq!(exact[0].hint, TransformHint::Opaque);
        assert_eq!(table.lookup("a/other.png")[0].target_path, "pattern/other.png");
    }

    #[test]
    fn test_first_pattern_wins() {
        let table = MappingTable::from_json_str(
            r#"{
                "schema_version": 2,
                "entries": [
                    {"source": "a/*.png", "targets": ["first/${1}.png"], "kind": "block-texture"},
                    {"source": "a/**", "targets": ["second/${1}"], "kind": "passthrough"}
                ]
            }"#,
        )
        .unwrap();

        let targets = table.lookup("a/x.png");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].target_path, "first/x.png");
        assert_eq!(table.lookup("a/b/x.png")[0].target_path, "second/b/x.png");
        assert!(table.lookup("b/x.png").is_empty());
    }

    #[test]
    fn test_multiple_targets() {
        let table = MappingTable::from_json_str(
            r#"{"schema_version": 1, "entries": [
                {"source": "g.png", "targets": ["one.png", "two.png"], "kind": "block-texture"}
            ]}"#,
        )
        .unwrap();
        let targets: Vec<_> = table
            .lookup("g.png")
            .into_iter()
            .map(|t| t.target_path)
            .collect();
        assert_eq!(targets, vec!["one.png", "two.png"]);
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            r#"{"schema_version": 99, "entries": [{"source": "a", "targets": ["b"], "kind": "passthrough"}]}"#,
            r#"{"schema_version": 2, "entries": []}"#,
            r#"{"schema_version": 2, "entries": [{"source": "a", "targets": [], "kind": "passthrough"}]}"#,
            r#"{"schema_version": 2, "entries": [
                {"source": "a", "targets": ["b"], "kind": "passthrough"},
                {"source": "a", "targets": ["c"], "kind": "passthrough"}
            ]}"#,
            r#"{"schema_version": 2, "entries": [{"source": "a/*", "targets": ["${2}"], "kind": "passthrough"}]}"#,
            r#"{"schema_version": 2, "entries": [{"source": "a/*.png", "targets": ["b/$1_x.png"], "kind": "passthrough"}]}"#,
            r#"{"schema_version": 2, "entries": [{"source": "a", "targets": ["b"], "kind": "sound"}]}"#,
        ];
        for case in cases {
            let err = MappingTable::from_json_str(case).unwrap_err();
            assert!(
                matches!(err, Error::InvalidMappingTable { .. }),
                "expected invalid table for {case}, got {err:?}"
            );
        }
    }
}

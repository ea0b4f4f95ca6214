//! Target pack builder state
//!
//! Target paths are unique. A second write to the same path either merges
//! (for JSON index files Bedrock reads as a whole) or overwrites and hands
//! back the earlier source so the run can record a warning.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::manifest::MANIFEST_PATH;

/// Targets that collect records from many sources
pub const MERGEABLE_TARGETS: &[&str] = &[
    "textures/flipbook_textures.json",
    "textures/terrain_texture.json",
    "textures/item_texture.json",
];

/// Whether writes to `target_path` merge instead of overwriting
#[must_use]
pub fn is_mergeable(target_path: &str) -> bool {
    MERGEABLE_TARGETS.contains(&target_path)
}

/// What happened when an entry was added
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First write to this path
    Added,
    /// Combined with earlier content
    Merged,
    /// Replaced content written from the given source
    Overwrote(String),
}

/// Accumulated `{target path → bytes}` of one run
#[derive(Debug, Default)]
pub struct TargetPack {
    entries: BTreeMap<String, Vec<u8>>,
    /// Target path → source that last wrote it
    sources: HashMap<String, String>,
}

impl TargetPack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `data` for `target_path`, written from `source_path`
    ///
    /// Fails for the reserved manifest path, and when mergeable content is
    /// not JSON of the same shape as what is already there.
    pub fn insert(&mut self, target_path: &str, source_path: &str, data: Vec<u8>) -> Result<InsertOutcome> {
        if target_path == MANIFEST_PATH {
            return Err(Error::unsupported(format!(
                "{MANIFEST_PATH} is generated and cannot be a mapping target"
            )));
        }

        let outcome = match self.entries.get_mut(target_path) {
            None => {
                self.entries.insert(target_path.to_string(), data);
                InsertOutcome::Added
            }
            Some(existing) if is_mergeable(target_path) => {
                *existing = merge_json(existing, &data, target_path)?;
                InsertOutcome::Merged
            }
            Some(existing) => {
                *existing = data;
                let previous = self.sources.get(target_path).cloned().unwrap_or_default();
                InsertOutcome::Overwrote(previous)
            }
        };

        self.sources
            .insert(target_path.to_string(), source_path.to_string());
        Ok(outcome)
    }

    #[must_use]
    pub fn get(&self, target_path: &str) -> Option<&[u8]> {
        self.entries.get(target_path).map(Vec::as_slice)
    }

    /// Entries in canonical (sorted) order
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Vec<u8>> {
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
}

/// Arrays concatenate, objects union by key (later keys win)
fn merge_json(existing: &[u8], incoming: &[u8], target_path: &str) -> Result<Vec<u8>> {
    let parse = |bytes: &[u8]| {
        serde_json::from_slice::<Value>(bytes)
            .map_err(|e| Error::unsupported(format!("{target_path}: cannot merge non-JSON content: {e}")))
    };

    let merged = match (parse(existing)?, parse(incoming)?) {
        (Value::Array(mut left), Value::Array(right)) => {
            left.extend(right);
            Value::Array(left)
        }
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                left.insert(key, value);
            }
            Value::Object(left)
        }
        _ => {
            return Err(Error::unsupported(format!(
                "{target_path}: cannot merge JSON of different shapes"
            )));
        }
    };

    Ok(serde_json::to_vec(&merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overwrite_reports_previous_source() {
        let mut pack = TargetPack::new();
        let target = "textures/blocks/planks_oak.png";
        assert_eq!(pack.insert(target, "a.png", b"a".to_vec()).unwrap(), InsertOutcome::Added);
        assert_eq!(
            pack.insert(target, "b.png", b"b".to_vec()).unwrap(),
            InsertOutcome::Overwrote("a.png".to_string())
        );
        assert_eq!(pack.get(target), Some(&b"b"[..]));
        assert_eq!(pack.len(), 1);
    }

    #[test]
    fn test_flipbook_arrays_concatenate() {
        let mut pack = TargetPack::new();
        let target = "textures/flipbook_textures.json";
        pack.insert(target, "a.png.mcmeta", br#"[{"atlas_tile":"a"}]"#.to_vec())
            .unwrap();
        assert_eq!(
            pack.insert(target, "b.png.mcmeta", br#"[{"atlas_tile":"b"}]"#.to_vec())
                .unwrap(),
            InsertOutcome::Merged
        );

        let merged: Value = serde_json::from_slice(pack.get(target).unwrap()).unwrap();
        assert_eq!(merged, serde_json::json!([{"atlas_tile": "a"}, {"atlas_tile": "b"}]));
    }

    #[test]
    fn test_objects_union_and_shape_mismatch() {
        let mut pack = TargetPack::new();
        let target = "textures/terrain_texture.json";
        pack.insert(target, "x", br#"{"a": 1, "b": 1}"#.to_vec()).unwrap();
        pack.insert(target, "y", br#"{"b": 2, "c": 3}"#.to_vec()).unwrap();
        let merged: Value = serde_json::from_slice(pack.get(target).unwrap()).unwrap();
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 2, "c": 3}));

        assert!(pack.insert(target, "z", b"[1]".to_vec()).is_err());
    }

    #[test]
    fn test_manifest_target_is_rejected() {
        let mut pack = TargetPack::new();
        assert!(pack.insert(MANIFEST_PATH, "manifest.json", b"{}".to_vec()).is_err());
        assert!(pack.is_empty());
    }
}

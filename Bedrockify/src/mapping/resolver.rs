//! Identifier mapper: source path → Bedrock target paths
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use super::table::MappingTable;
use super::types::ResolvedTarget;

/// A source entry no table row matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedAsset {
    pub source_path: String,
    pub reason: String,
}

/// Outcome of resolving one source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One or more targets
    Mapped(Vec<ResolvedTarget>),
    /// No mapping; reported as a warning
    Unmapped(UnmappedAsset),
    /// No mapping for a required asset; reported as an error
    RequiredUnmapped(UnmappedAsset),
}

/// Normalize separators: `\` becomes `/`, leading `./` and `/` are dropped
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    loop {
        if let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        } else if let Some(rest) = normalized.strip_prefix('/') {
            normalized = rest.to_string();
        } else {
            break;
        }
    }
    normalized
}

/// Resolves source paths against a shared table
#[derive(Debug, Clone, Copy)]
pub struct IdentifierMapper<'a> {
    table: &'a MappingTable,
    required: &'a BTreeSet<String>,
}

impl<'a> IdentifierMapper<'a> {
    #[must_use]
    pub fn new(table: &'a MappingTable, required: &'a BTreeSet<String>) -> Self {
        Self { table, required }
    }

    /// Targets for `source_path`; empty when unmapped
    #[must_use]
    pub fn resolve(&self, source_path: &str) -> Vec<ResolvedTarget> {
        self.table.lookup(&normalize_path(source_path))
    }

    /// Resolve and classify, applying the required-asset policy
    #[must_use]
    pub fn classify(&self, source_path: &str) -> Resolution {
        let normalized = normalize_path(source_path);
        let targets = self.table.lookup(&normalized);
        if !targets.is_empty() {
            return Resolution::Mapped(targets);
        }

        if self.required.contains(&normalized) {
            Resolution::RequiredUnmapped(UnmappedAsset {
                source_path: normalized,
                reason: "required asset has no Bedrock mapping".to_string(),
            })
        } else {
            Resolution::Unmapped(UnmappedAsset {
                source_path: normalized,
                reason: "no Bedrock mapping for this asset".to_string(),
            })
        }
    }
}

//! Types for mapping table entries
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// What kind of asset a mapped entry is, decided once by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    BlockTexture,
    ItemTexture,
    EntityTexture,
    UiTexture,
    /// Copied through unchanged
    Passthrough,
    /// Java `.png.mcmeta` animation sidecar, becomes a flipbook record
    AnimationMetadata,
}

impl AssetKind {
    /// Whether the asset is decoded and re-encoded as an image
    #[must_use]
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::BlockTexture | Self::ItemTexture | Self::EntityTexture | Self::UiTexture
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockTexture => "block-texture",
            Self::ItemTexture => "item-texture",
            Self::EntityTexture => "entity-texture",
            Self::UiTexture => "ui-texture",
            Self::Passthrough => "passthrough",
            Self::AnimationMetadata => "animation-metadata",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra pixel operation applied while normalizing a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformHint {
    /// Normalize encoding only
    #[default]
    None,
    /// Force every pixel fully opaque
    Opaque,
    /// Keep only the first square frame of a vertical animation strip
    FirstFrame,
}

/// One row of the mapping table, as written in the table document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Exact source path or wildcard pattern (`*` within a segment, `**` across)
    pub source: String,
    /// Target path templates; `${n}` refers to the n-th wildcard capture
    pub targets: Vec<String>,
    pub kind: AssetKind,
    #[serde(default, skip_serializing_if = "is_default_hint")]
    pub hint: TransformHint,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde passes by reference
fn is_default_hint(hint: &TransformHint) -> bool {
    *hint == TransformHint::None
}

impl MappingEntry {
    /// Whether the source contains wildcards
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        self.source.contains('*')
    }
}

/// A single resolved destination for a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target_path: String,
    pub kind: AssetKind,
    pub hint: TransformHint,
}

/// A source entry bound to one of its targets, owned by a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub source_path: String,
    pub target_path: String,
    pub kind: AssetKind,
    pub hint: TransformHint,
    /// Source bytes until transformed, output bytes after
    pub data: Vec<u8>,
    pub transformed: bool,
}

impl ResolvedAsset {
    /// Bind raw source bytes to a resolved target
    #[must_use]
    pub fn new(source_path: impl Into<String>, target: &ResolvedTarget, raw: Vec<u8>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target.target_path.clone(),
            kind: target.kind,
            hint: target.hint,
            data: raw,
            transformed: false,
        }
    }

    /// Replace the raw bytes with transformed output
    #[must_use]
    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.data = output;
        self.transformed = true;
        self
    }
}

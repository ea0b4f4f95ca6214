//! Java animation sidecars (`.png.mcmeta`) and Bedrock flipbook records
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Animation settings of one Java texture, in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationMeta {
    /// Game ticks per frame
    pub frametime: u32,
    /// Blend between frames
    pub interpolate: bool,
    /// Explicit frame order, strip order when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<u32>>,
}

#[derive(Deserialize)]
struct SidecarDocument {
    animation: Option<RawAnimation>,
}

#[derive(Deserialize)]
struct RawAnimation {
    frametime: Option<u32>,
    interpolate: Option<bool>,
    frames: Option<Vec<RawFrame>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrame {
    Index(u32),
    // Bedrock has no per-frame timing; only the index is kept
    Timed { index: u32 },
}

#[derive(Serialize, Deserialize)]
struct CanonicalDocument {
    animation: AnimationMeta,
}

impl AnimationMeta {
    /// Parse a Java sidecar
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let document: SidecarDocument = serde_json::from_slice(bytes)
            .map_err(|e| Error::unsupported(format!("malformed animation metadata: {e}")))?;
        let raw = document
            .animation
            .ok_or_else(|| Error::unsupported("sidecar has no animation section"))?;

        let frames = raw.frames.map(|frames| {
            frames
                .into_iter()
                .map(|frame| match frame {
                    RawFrame::Index(index) | RawFrame::Timed { index } => index,
                })
                .collect()
        });

        Ok(Self {
            frametime: raw.frametime.unwrap_or(1).max(1),
            interpolate: raw.interpolate.unwrap_or(false),
            frames,
        })
    }

    /// Canonical sidecar bytes: same settings always serialize identically
    pub fn to_canonical_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&CanonicalDocument {
            animation: self.clone(),
        })?)
    }

    /// Read back canonical bytes produced by [`Self::to_canonical_json`]
    pub fn from_canonical_json(bytes: &[u8]) -> Result<Self> {
        let document: CanonicalDocument = serde_json::from_slice(bytes)?;
        Ok(document.animation)
    }
}

/// One entry of Bedrock's `textures/flipbook_textures.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipbookRecord {
    pub flipbook_texture: String,
    pub atlas_tile: String,
    pub ticks_per_frame: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<u32>>,
    pub blend_frames: bool,
}

impl FlipbookRecord {
    /// Record for a texture written at `texture_target` (e.g. `textures/blocks/fire_0.png`)
    #[must_use]
    pub fn new(meta: &AnimationMeta, texture_target: &str) -> Self {
        let flipbook_texture = texture_target
            .strip_suffix(".png")
            .unwrap_or(texture_target)
            .to_string();
        let atlas_tile = flipbook_texture
            .rsplit('/')
            .next()
            .unwrap_or(&flipbook_texture)
            .to_string();

        Self {
            flipbook_texture,
            atlas_tile,
            ticks_per_frame: meta.frametime,
            frames: meta.frames.clone(),
            blend_frames: meta.interpolate,
        }
    }
}

/// JSON array fragment with one record per texture target
pub fn flipbook_fragment(meta: &AnimationMeta, texture_targets: &[String]) -> Result<Vec<u8>> {
    let records: Vec<FlipbookRecord> = texture_targets
        .iter()
        .map(|target| FlipbookRecord::new(meta, target))
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

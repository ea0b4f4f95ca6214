//! Bedrock pack manifest
//!
//! The manifest identifies the generated pack to the game: name,
//! description, a stable UUID, a version and the minimum engine version
//! that understands the layout the mapping table produces.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod builder;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use builder::{ManifestBuilder, pack_id};

/// Path of the manifest inside a Bedrock pack
pub const MANIFEST_PATH: &str = "manifest.json";

/// Manifest `format_version` written by this crate
pub const MANIFEST_FORMAT_VERSION: u32 = 2;

/// Mapping table schema version → minimum Bedrock engine version
const ENGINE_COMPATIBILITY: &[(u32, [u32; 3])] = &[
    (1, [1, 13, 0]),
    (2, [1, 16, 0]),
    (3, [1, 20, 0]),
];

/// Minimum engine version for a mapping table schema, `None` if unknown
#[must_use]
pub fn min_engine_version(schema_version: u32) -> Option<[u32; 3]> {
    ENGINE_COMPATIBILITY
        .iter()
        .find(|(schema, _)| *schema == schema_version)
        .map(|(_, version)| *version)
}

/// A Bedrock `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub header: ManifestHeader,
    pub modules: Vec<ManifestModule>,
}

/// Pack identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub name: String,
    pub description: String,
    /// Pack id, derived from name and description
    pub uuid: Uuid,
    pub version: [u32; 3],
    pub min_engine_version: [u32; 3],
}

/// One module of the pack; resource packs have a single `resources` module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModule {
    #[serde(rename = "type")]
    pub module_type: String,
    pub uuid: Uuid,
    pub version: [u32; 3],
}

impl Manifest {
    /// Pack id
    #[must_use]
    pub fn pack_id(&self) -> Uuid {
        self.header.uuid
    }

    /// Pretty JSON as written into the archive
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse a manifest back from JSON
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

//! Manifest synthesis from pack metadata and the resolved asset set
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use uuid::Uuid;

use super::{MANIFEST_FORMAT_VERSION, Manifest, ManifestHeader, ManifestModule, min_engine_version};
use crate::archive::PackMetadata;
use crate::mapping::ResolvedAsset;

/// Namespace for pack ids
const PACK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9b54_4d17_8e0a_52c3_b7d9_14f6);

/// Name of the single resource module, also the module id seed
const RESOURCES_MODULE: &str = "resources";

/// Used when the mapping table declares a schema the engine table lacks
const FALLBACK_ENGINE_VERSION: [u32; 3] = [1, 20, 0];

/// Builds a [`Manifest`] for one run
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    schema_version: u32,
    name: Option<String>,
    version: [u32; 3],
    fallback_name: String,
}

impl ManifestBuilder {
    /// Builder for packs produced by a table of `schema_version`
    #[must_use]
    pub fn new(schema_version: u32) -> Self {
        Self {
            schema_version,
            name: None,
            version: [1, 0, 0],
            fallback_name: "Java Resource Pack".to_string(),
        }
    }

    /// Explicit pack name, overriding the Java description
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        self.name = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Pack and module version
    #[must_use]
    pub fn version(mut self, version: [u32; 3]) -> Self {
        self.version = version;
        self
    }

    /// Name used when neither the caller nor the Java pack provides one
    #[must_use]
    pub fn fallback_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_name = name.into();
        self
    }

    /// Synthesize the manifest
    ///
    /// Identity depends only on the resulting name and description, so the
    /// same input always produces the same pack id.
    #[must_use]
    pub fn build(&self, metadata: Option<&PackMetadata>, assets: &[ResolvedAsset]) -> Manifest {
        let name = self
            .name
            .clone()
            .or_else(|| metadata.and_then(PackMetadata::title).map(str::to_string))
            .unwrap_or_else(|| self.fallback_name.clone());

        let description = metadata
            .map(|meta| meta.description.clone())
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| format!("Converted from Java Edition ({} assets)", assets.len()));

        let pack_id = pack_id(&name, &description);
        let module_id = Uuid::new_v5(&pack_id, RESOURCES_MODULE.as_bytes());

        let min_engine_version = min_engine_version(self.schema_version).unwrap_or_else(|| {
            tracing::warn!(
                "No engine version for schema {}, using {FALLBACK_ENGINE_VERSION:?}",
                self.schema_version
            );
            FALLBACK_ENGINE_VERSION
        });

        tracing::debug!("Manifest for {name:?}: pack id {pack_id}");

        Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            header: ManifestHeader {
                name,
                description,
                uuid: pack_id,
                version: self.version,
                min_engine_version,
            },
            modules: vec![ManifestModule {
                module_type: RESOURCES_MODULE.to_string(),
                uuid: module_id,
                version: self.version,
            }],
        }
    }
}

/// Stable pack id for a name and description
#[must_use]
pub fn pack_id(name: &str, description: &str) -> Uuid {
    Uuid::new_v5(&PACK_ID_NAMESPACE, format!("{name}\n{description}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{AssetKind, ResolvedTarget, TransformHint};
    use pretty_assertions::assert_eq;

    fn meta(description: &str) -> PackMetadata {
        PackMetadata {
            pack_format: 15,
            description: description.to_string(),
        }
    }

    fn asset(path: &str) -> ResolvedAsset {
        let target = ResolvedTarget {
            target_path: path.to_string(),
            kind: AssetKind::BlockTexture,
            hint: TransformHint::None,
        };
        ResolvedAsset::new(path, &target, Vec::new())
    }

    #[test]
    fn test_identity_is_stable() {
        let builder = ManifestBuilder::new(3);
        let a = builder.build(Some(&meta("Faithful\nBy the team")), &[]);
        let b = builder.build(Some(&meta("Faithful\nBy the team")), &[asset("x")]);
        assert_eq!(a.header.uuid, b.header.uuid);
        assert_eq!(a.modules[0].uuid, b.modules[0].uuid);
        assert_ne!(a.header.uuid, a.modules[0].uuid);

        let c = builder.build(Some(&meta("Other")), &[]);
        assert_ne!(a.header.uuid, c.header.uuid);
        assert_eq!(a.header.uuid.get_version_num(), 5);
    }

    #[test]
    fn test_name_fallbacks() {
        let from_meta = ManifestBuilder::new(3).build(Some(&meta("Faithful\nBy the team")), &[]);
        assert_eq!(from_meta.header.name, "Faithful");
        assert_eq!(from_meta.header.description, "Faithful\nBy the team");

        let explicit = ManifestBuilder::new(3)
            .name("  Mine  ")
            .build(Some(&meta("Faithful")), &[]);
        assert_eq!(explicit.header.name, "Mine");

        let blank = ManifestBuilder::new(3)
            .name("   ")
            .fallback_name("Unnamed")
            .build(Some(&meta("")), &[asset("a"), asset("b")]);
        assert_eq!(blank.header.name, "Unnamed");
        assert_eq!(
            blank.header.description,
            "Converted from Java Edition (2 assets)"
        );
    }

    #[test]
    fn test_version_and_engine() {
        let manifest = ManifestBuilder::new(1).version([2, 3, 4]).build(None, &[]);
        assert_eq!(manifest.header.version, [2, 3, 4]);
        assert_eq!(manifest.modules[0].version, [2, 3, 4]);
        assert_eq!(manifest.header.min_engine_version, [1, 13, 0]);
        assert_eq!(manifest.format_version, 2);
    }
}

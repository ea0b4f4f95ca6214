//! Configuration for conversion runs
//!
//! Options are plain data: built in code with the `with_*` methods or loaded
//! from a TOML document, then validated once before a run starts.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Compression applied to entries of the output archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCompression {
    /// Entries are stored uncompressed
    Stored,
    /// Entries are deflated (recommended)
    #[default]
    Deflated,
}

impl OutputCompression {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Deflated => "deflated",
        }
    }
}

/// Options for a single conversion run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionOptions {
    /// Source paths that must be present and mapped
    pub required_assets: BTreeSet<String>,
    /// Version tuple written to the manifest header and module
    pub pack_version: [u32; 3],
    /// Compression for output entries
    pub compression: OutputCompression,
    /// Deflate level (0-9); `None` uses the zip default
    pub compression_level: Option<i64>,
    /// Upper bound for the sealed archive in bytes
    pub max_output_size: u64,
    /// Transform batches of assets on the rayon pool
    pub parallel_transforms: bool,
    /// Number of assets per parallel batch
    pub batch_size: usize,
    /// Pack name used when neither the caller nor the pack provides one
    pub fallback_name: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            required_assets: BTreeSet::new(),
            pack_version: [1, 0, 0],
            compression: OutputCompression::Deflated,
            compression_level: None,
            max_output_size: 512 * 1024 * 1024,
            parallel_transforms: false,
            batch_size: 32,
            fallback_name: "Java Resource Pack".to_string(),
        }
    }
}

impl ConversionOptions {
    /// Create options with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a TOML document; missing keys keep their defaults
    pub fn from_toml_str(toml_source: &str) -> Result<Self> {
        let options: Self = toml::from_str(toml_source)?;
        options.validate()?;
        Ok(options)
    }

    /// Mark a source path as required
    #[must_use]
    pub fn with_required_asset(mut self, path: impl Into<String>) -> Self {
        self.required_assets.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_pack_version(mut self, version: [u32; 3]) -> Self {
        self.pack_version = version;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: OutputCompression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_max_output_size(mut self, bytes: u64) -> Self {
        self.max_output_size = bytes;
        self
    }

    /// Enable batched parallel transforms
    #[must_use]
    pub fn with_parallel_transforms(mut self, batch_size: usize) -> Self {
        self.parallel_transforms = true;
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_fallback_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_name = name.into();
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_options("batch_size must be at least 1"));
        }
        if let Some(level) = self.compression_level
            && !(0..=9).contains(&level)
        {
            return Err(Error::invalid_options(format!(
                "compression_level {level} out of range (0-9)"
            )));
        }
        if self.max_output_size == 0 {
            return Err(Error::invalid_options("max_output_size must be non-zero"));
        }
        if self.fallback_name.trim().is_empty() {
            return Err(Error::invalid_options("fallback_name must not be empty"));
        }
        if let Some(path) = self.required_assets.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::invalid_options(format!(
                "required asset path {path:?} is empty"
            )));
        }
        Ok(())
    }
}

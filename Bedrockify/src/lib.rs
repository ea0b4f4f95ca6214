//! # Bedrockify
//!
//! Converts Minecraft Java Edition resource packs into Bedrock Edition
//! resource packs, entirely in memory.
//!
//! ## Pipeline
//!
//! - **Mapping table** - versioned Java → Bedrock path correspondences
//! - **Archive reader** - opens and validates the Java pack zip
//! - **Identifier mapper** - resolves each Java path to Bedrock targets
//! - **Texture transformer** - normalizes PNG textures, canonicalizes animations
//! - **Manifest builder** - synthesizes a deterministic `manifest.json`
//! - **Archive writer** - seals the Bedrock pack in canonical order
//! - **Orchestrator and worker** - drive runs, optionally on a background thread
//!
//! ## Quick Start
//!
//! ```no_run
//! use bedrockify::prelude::*;
//!
//! let input = std::fs::read("Faithful.zip")?;
//! let converter = Converter::new(MappingTable::builtin(), ConversionOptions::default());
//!
//! match converter.convert(&input, None) {
//!     ConversionOutcome::Done(result) => {
//!         std::fs::write("Faithful.mcpack", &result.archive)?;
//!         println!("converted with {} warnings", result.warnings.len());
//!     }
//!     ConversionOutcome::Failed(e) => return Err(e),
//!     ConversionOutcome::Cancelled => {}
//! }
//! # Ok::<(), bedrockify::Error>(())
//! ```
//!
//! ### Background Worker
//!
//! ```no_run
//! use std::sync::Arc;
//! use bedrockify::prelude::*;
//!
//! let table = Arc::new(MappingTable::from_json_str(&std::fs::read_to_string("table.json")?)?);
//! let worker = ConversionWorker::spawn(table, WorkerOptions::default())?;
//! worker.convert(std::fs::read("Faithful.zip")?, Some("Faithful".into()));
//!
//! for event in worker.wait_for_terminal() {
//!     println!("{}", event.to_json()?);
//! }
//! # Ok::<(), bedrockify::Error>(())
//! ```
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

pub mod archive;
pub mod convert;
pub mod error;
pub mod manifest;
pub mod mapping;
pub mod options;
pub mod texture;
pub mod worker;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::options::{ConversionOptions, OutputCompression};

    pub use crate::mapping::{
        AssetKind, IdentifierMapper, MappingEntry, MappingTable, Resolution, TransformHint,
    };
    pub use crate::archive::{ArchiveWriter, PackMetadata, SourcePack};
    pub use crate::manifest::{Manifest, ManifestBuilder};
    pub use crate::texture::{transform, transform_with_hint};

    // Runs
    pub use crate::convert::{
        AssetError, AssetWarning, CancelToken, ConversionOutcome, ConversionProgress,
        ConversionResult, ConversionState, Converter,
    };

    // Background worker
    pub use crate::worker::{
        ConversionWorker, PROTOCOL_VERSION, WorkerEvent, WorkerHandle, WorkerOptions,
        WorkerRequest,
    };
}

//! Pack archive operations module
//!
//! Reading Java pack zips into a [`SourcePack`] and sealing Bedrock pack
//! zips with [`ArchiveWriter`].
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod metadata;
mod reader;
mod writer;

pub use metadata::{PACK_METADATA_PATH, PackMetadata};
pub use reader::{DuplicateEntry, SourceEntry, SourcePack};
pub use writer::ArchiveWriter;

//! Mapping table and identifier resolution
//!
//! Java asset paths are looked up verbatim (after separator normalization):
//! an exact source wins over any pattern, and patterns are tried in the
//! order the table declares them with the first match winning.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod pattern;
mod resolver;
mod table;
mod types;

pub use resolver::{IdentifierMapper, Resolution, UnmappedAsset, normalize_path};
pub use table::MappingTable;
pub use types::{AssetKind, MappingEntry, ResolvedAsset, ResolvedTarget, TransformHint};

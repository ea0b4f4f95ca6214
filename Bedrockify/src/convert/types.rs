//! Types for conversion runs: progress, state, results
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::manifest::Manifest;
use crate::mapping::AssetKind;

// ============================================================================
// Progress Types
// ============================================================================

/// Progress callback type for conversion runs
pub type ConversionProgressCallback<'a> = &'a (dyn Fn(&ConversionProgress) + Sync + Send);

/// Progress information during a conversion run
///
/// Reported once per source entry after it has been mapped and transformed.
#[derive(Debug, Clone)]
pub struct ConversionProgress {
    /// Entries processed so far
    pub current: usize,
    /// Total number of entries
    pub total: usize,
    /// Source path of the entry just processed (if applicable)
    pub current_file: Option<String>,
}

impl ConversionProgress {
    /// Create a progress update for the entry at `file`
    #[must_use]
    pub fn with_file(current: usize, total: usize, file: impl Into<String>) -> Self {
        Self {
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Entries processed / total entries (0.0 - 1.0)
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

// ============================================================================
// Run State
// ============================================================================

/// Lifecycle of one conversion run
///
/// `Idle → Reading → Mapping → Transforming → Finalizing → Done`, with
/// `Failed` reachable from `Reading` and `Finalizing` and `Cancelled` from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionState {
    #[default]
    Idle,
    Reading,
    Mapping,
    Transforming,
    Finalizing,
    Done,
    Failed,
    Cancelled,
}

impl ConversionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Whether the state machine allows moving from `self` to `next`
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (from, Self::Cancelled) => !from.is_terminal(),
            (Self::Idle, Self::Reading)
            | (Self::Reading, Self::Mapping | Self::Failed)
            | (Self::Mapping, Self::Transforming)
            | (Self::Transforming, Self::Finalizing)
            | (Self::Finalizing, Self::Done | Self::Failed) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Mapping => "mapping",
            Self::Transforming => "transforming",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A recoverable problem with one source entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWarning {
    pub source_path: String,
    pub reason: String,
}

impl AssetWarning {
    #[must_use]
    pub fn new(source_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            reason: reason.into(),
        }
    }
}

/// An asset-level error; the run still completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetError {
    /// `None` for errors about the pack as a whole, like a missing required asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub kind: ErrorKind,
    pub reason: String,
}

impl AssetError {
    /// Record `error` against a source entry
    #[must_use]
    pub fn from_error(source_path: impl Into<String>, error: &Error) -> Self {
        Self {
            source_path: Some(source_path.into()),
            kind: error.kind(),
            reason: error.to_string(),
        }
    }

    /// A required asset absent from the source pack
    #[must_use]
    pub fn required_missing(path: &str) -> Self {
        Self {
            source_path: None,
            kind: ErrorKind::RequiredAssetMissing,
            reason: Error::RequiredAssetMissing {
                path: path.to_string(),
            }
            .to_string(),
        }
    }
}

/// Counts for "converted with N warnings" presentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    /// Files in the source archive, including the metadata file and
    /// entries dropped as duplicates
    pub entries_seen: usize,
    /// Resolved assets written, per kind
    pub assets_written: BTreeMap<AssetKind, usize>,
    /// Entries in the output archive, including the manifest
    pub output_entries: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl ConversionSummary {
    /// Total resolved assets written
    #[must_use]
    pub fn total_written(&self) -> usize {
        self.assets_written.values().sum()
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Sealed Bedrock pack
    pub archive: Vec<u8>,
    pub manifest: Manifest,
    /// In source order
    pub warnings: Vec<AssetWarning>,
    /// In source order, pack-level errors first
    pub errors: Vec<AssetError>,
    pub summary: ConversionSummary,
}

/// Terminal outcome of a run
#[derive(Debug)]
pub enum ConversionOutcome {
    Done(ConversionResult),
    /// Run-level failure; no output
    Failed(Error),
    /// Stopped on request; no output
    Cancelled,
}

impl ConversionOutcome {
    /// Final state of the run
    #[must_use]
    pub fn state(&self) -> ConversionState {
        match self {
            Self::Done(_) => ConversionState::Done,
            Self::Failed(_) => ConversionState::Failed,
            Self::Cancelled => ConversionState::Cancelled,
        }
    }

    /// The result, if the run completed
    #[must_use]
    pub fn into_result(self) -> Option<ConversionResult> {
        match self {
            Self::Done(result) => Some(result),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }
}

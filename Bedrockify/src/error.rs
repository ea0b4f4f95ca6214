//! Error types for `Bedrockify`
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error type for `Bedrockify` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from reading or writing buffers.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Run-level (fatal) Errors ====================
    /// The input archive cannot be parsed or one of its entries is damaged.
    #[error("archive is corrupt: {message}")]
    ArchiveCorrupt {
        /// Description of what could not be read.
        message: String,
    },

    /// The output archive could not be sealed.
    #[error("failed to write output archive: {message}")]
    ArchiveWriteFailure {
        /// Description of the write failure.
        message: String,
    },

    // ==================== Asset-level Errors ====================
    /// The requested path is not present in the source pack.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// The asset bytes are not in an encoding the transformer can read.
    #[error("unsupported asset format: {message}")]
    UnsupportedAssetFormat {
        /// Description of the decode failure.
        message: String,
    },

    /// An asset listed as required is missing or has no mapping.
    #[error("required asset missing: {path}")]
    RequiredAssetMissing {
        /// Source path of the required asset.
        path: String,
    },

    // ==================== Setup Errors ====================
    /// The mapping table failed validation.
    #[error("invalid mapping table: {message}")]
    InvalidMappingTable {
        /// The validation error message.
        message: String,
    },

    /// Conversion options failed validation.
    #[error("invalid options: {message}")]
    InvalidOptions {
        /// The validation error message.
        message: String,
    },

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML options parsing error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl Error {
    /// Category of this error as used in results and worker messages
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::ArchiveCorrupt { .. } => ErrorKind::ArchiveCorrupt,
            Self::ArchiveWriteFailure { .. } => ErrorKind::ArchiveWriteFailure,
            Self::EntryNotFound(_) => ErrorKind::EntryNotFound,
            Self::UnsupportedAssetFormat { .. } => ErrorKind::UnsupportedAssetFormat,
            Self::RequiredAssetMissing { .. } => ErrorKind::RequiredAssetMissing,
            Self::InvalidMappingTable { .. } => ErrorKind::InvalidMappingTable,
            Self::InvalidOptions { .. } => ErrorKind::InvalidOptions,
            Self::JsonError(_) | Self::TomlError(_) => ErrorKind::Parse,
        }
    }

    /// Whether this error aborts a conversion run
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::ArchiveCorrupt {
            message: message.into(),
        }
    }

    pub(crate) fn write_failure(message: impl Into<String>) -> Self {
        Self::ArchiveWriteFailure {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedAssetFormat {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidMappingTable {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}

/// Fieldless error category, serialized as the `errorKind` of worker messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Io,
    ArchiveCorrupt,
    ArchiveWriteFailure,
    EntryNotFound,
    UnsupportedAssetFormat,
    RequiredAssetMissing,
    InvalidMappingTable,
    InvalidOptions,
    Parse,
}

impl ErrorKind {
    /// Only archive-level failures abort a run
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::ArchiveCorrupt | Self::ArchiveWriteFailure)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Io => "Io",
            Self::ArchiveCorrupt => "ArchiveCorrupt",
            Self::ArchiveWriteFailure => "ArchiveWriteFailure",
            Self::EntryNotFound => "EntryNotFound",
            Self::UnsupportedAssetFormat => "UnsupportedAssetFormat",
            Self::RequiredAssetMissing => "RequiredAssetMissing",
            Self::InvalidMappingTable => "InvalidMappingTable",
            Self::InvalidOptions => "InvalidOptions",
            Self::Parse => "Parse",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specialized Result type for `Bedrockify` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_archive_errors_are_fatal() {
        assert!(Error::corrupt("eocd").is_fatal());
        assert!(Error::write_failure("too big").is_fatal());
        assert!(!Error::unsupported("not a png").is_fatal());
        assert!(!Error::EntryNotFound("pack.png".into()).is_fatal());
        assert!(
            !Error::RequiredAssetMissing {
                path: "pack.png".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_kind_serializes_as_plain_name() {
        let json = serde_json::to_string(&ErrorKind::ArchiveCorrupt).unwrap();
        assert_eq!(json, "\"ArchiveCorrupt\"");
        assert_eq!(ErrorKind::RequiredAssetMissing.to_string(), "RequiredAssetMissing");
    }
}

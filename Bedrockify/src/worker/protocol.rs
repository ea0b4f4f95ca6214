//! Worker message protocol
//!
//! Requests and events are tagged by `op`, field names are camelCase and
//! binary payloads are base64 strings when serialized, so the same values
//! can cross a JSON boundary unchanged.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::convert::{AssetError, AssetWarning};
use crate::error::ErrorKind;

/// Version of the message schema below
pub const PROTOCOL_VERSION: u32 = 1;

/// Caller → worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WorkerRequest {
    /// Convert a Java pack archive
    Convert {
        #[serde(rename = "archiveBytes", with = "base64_bytes")]
        archive_bytes: Vec<u8>,
        /// Overrides the pack name from `pack.mcmeta`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Stop the current run at the next entry boundary
    Cancel,
}

impl WorkerRequest {
    /// Convert request without a name override
    #[must_use]
    pub fn convert(archive_bytes: Vec<u8>) -> Self {
        Self::Convert {
            archive_bytes,
            name: None,
        }
    }
}

/// Worker → caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WorkerEvent {
    /// An entry finished mapping and transforming
    Progress {
        /// Entries processed / total entries, 0.0 - 1.0
        fraction: f64,
        #[serde(rename = "currentPath", default, skip_serializing_if = "Option::is_none")]
        current_path: Option<String>,
    },
    /// The run produced a pack
    Done {
        #[serde(rename = "resultBytes", with = "base64_bytes")]
        result_bytes: Vec<u8>,
        warnings: Vec<AssetWarning>,
        errors: Vec<AssetError>,
    },
    /// The run hit a fatal error; there is no output
    Failed {
        #[serde(rename = "errorKind")]
        error_kind: ErrorKind,
        message: String,
    },
    /// The run stopped on request; nothing follows for this run
    Cancelled,
}

impl WorkerEvent {
    /// Whether this event ends a run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// Serialize to JSON for a text boundary
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ptr_arg)] // serde `with` hands over the field type
    pub fn serialize<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

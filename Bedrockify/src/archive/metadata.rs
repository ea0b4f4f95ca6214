//! `pack.mcmeta` parsing
//!
//! Java pack descriptions are text components: a plain string, an object
//! with `text` and optional `extra` children, or an array of components.
//! They are flattened to plain text here.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Path of the Java pack metadata file, relative to the pack root
pub const PACK_METADATA_PATH: &str = "pack.mcmeta";

/// Metadata declared by a Java pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMetadata {
    /// Java `pack_format` number
    pub pack_format: u32,
    /// Description flattened to plain text
    pub description: String,
}

#[derive(Deserialize)]
struct McmetaDocument {
    pack: McmetaPack,
}

#[derive(Deserialize)]
struct McmetaPack {
    pack_format: u32,
    #[serde(default)]
    description: Value,
}

impl PackMetadata {
    /// Parse the bytes of a `pack.mcmeta` file
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        // Some editors write a UTF-8 BOM
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let document: McmetaDocument = serde_json::from_slice(bytes)?;
        let mut description = String::new();
        flatten_text_component(&document.pack.description, &mut description);

        Ok(Self {
            pack_format: document.pack.pack_format,
            description: description.trim().to_string(),
        })
    }

    /// First non-empty description line, used as a pack name
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

fn flatten_text_component(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Array(parts) => {
            for part in parts {
                flatten_text_component(part, out);
            }
        }
        Value::Object(map) => {
            if let Some(text) = map.get("text") {
                flatten_text_component(text, out);
            } else if let Some(translate) = map.get("translate").and_then(Value::as_str) {
                out.push_str(translate);
            }
            if let Some(extra) = map.get("extra") {
                flatten_text_component(extra, out);
            }
        }
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => {}
    }
}

//! Bedrock pack archive writer
//!
//! Output is canonical: the manifest first, then every target path in
//! lexicographic order, all with the same fixed timestamp and permissions,
//! so identical inputs seal to identical bytes.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_PATH, Manifest};
use crate::options::{ConversionOptions, OutputCompression};

/// Assembles target entries and the manifest into a zip archive
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    compression: OutputCompression,
    compression_level: Option<i64>,
    max_size: u64,
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::from_options(&ConversionOptions::default())
    }
}

impl ArchiveWriter {
    /// Create a writer with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer configured from conversion options
    #[must_use]
    pub fn from_options(options: &ConversionOptions) -> Self {
        Self {
            compression: options.compression,
            compression_level: options.compression_level,
            max_size: options.max_output_size,
        }
    }

    /// Set the compression for every entry
    #[must_use]
    pub fn with_compression(mut self, compression: OutputCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the archive size limit in bytes
    #[must_use]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Write the manifest and all entries into a new archive
    ///
    /// Fails with [`Error::ArchiveWriteFailure`] if the archive would exceed
    /// the size limit or the zip encoder fails.
    pub fn seal(&self, entries: &BTreeMap<String, Vec<u8>>, manifest: &Manifest) -> Result<Vec<u8>> {
        if entries.contains_key(MANIFEST_PATH) {
            return Err(Error::write_failure(format!(
                "{MANIFEST_PATH} is reserved for the generated manifest"
            )));
        }

        let manifest_bytes = manifest.to_json_bytes()?;
        let raw_total: u64 = entries.values().map(|data| data.len() as u64).sum::<u64>()
            + manifest_bytes.len() as u64;
        if self.compression == OutputCompression::Stored && raw_total > self.max_size {
            return Err(Error::write_failure(format!(
                "{raw_total} bytes of entries exceed the {} byte limit",
                self.max_size
            )));
        }

        let options = self.file_options();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        write_entry(&mut writer, MANIFEST_PATH, &manifest_bytes, options)?;
        for (path, data) in entries {
            write_entry(&mut writer, path, data, options)?;
        }

        let bytes = writer
            .finish()
            .map_err(|e| Error::write_failure(format!("finalizing archive: {e}")))?
            .into_inner();

        if bytes.len() as u64 > self.max_size {
            return Err(Error::write_failure(format!(
                "archive is {} bytes, limit is {}",
                bytes.len(),
                self.max_size
            )));
        }

        tracing::debug!(
            "Sealed {} entries into {} bytes ({})",
            entries.len() + 1,
            bytes.len(),
            self.compression.as_str()
        );
        Ok(bytes)
    }

    fn file_options(&self) -> SimpleFileOptions {
        let base = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        match self.compression {
            OutputCompression::Stored => base.compression_method(CompressionMethod::Stored),
            OutputCompression::Deflated => base
                .compression_method(CompressionMethod::Deflated)
                .compression_level(self.compression_level),
        }
    }
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    writer
        .start_file(path, options)
        .map_err(|e| Error::write_failure(format!("{path}: {e}")))?;
    writer
        .write_all(data)
        .map_err(|e| Error::write_failure(format!("{path}: {e}")))
}

//! Source pack reader
//!
//! Opens a Java pack archive from memory, validates every entry and keeps
//! the decompressed contents for random access during a run.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use super::metadata::{PACK_METADATA_PATH, PackMetadata};
use crate::error::{Error, Result};
use crate::mapping::normalize_path;

/// Upper bound for up-front buffer reservation, declared sizes are untrusted
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// A file inside the source pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Normalized, pack-relative path
    pub path: String,
    /// Decompressed contents
    pub data: Vec<u8>,
}

impl SourceEntry {
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// An archive entry whose normalized path was already taken by an earlier one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    /// Name as stored in the archive
    pub archive_name: String,
    /// Normalized path it collided on
    pub path: String,
}

/// An opened, validated Java resource pack
#[derive(Debug, Clone)]
pub struct SourcePack {
    entries: Vec<SourceEntry>,
    index: HashMap<String, usize>,
    duplicates: Vec<DuplicateEntry>,
    metadata: Option<PackMetadata>,
    metadata_error: Option<String>,
    root_prefix: Option<String>,
}

impl SourcePack {
    /// Open a pack from archive bytes
    ///
    /// Fails with [`Error::ArchiveCorrupt`] when the central directory cannot
    /// be parsed or an entry does not decompress to its declared size.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::corrupt(format!("cannot read central directory: {e}")))?;

        let mut raw = Vec::with_capacity(archive.len());
        let mut archive_names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::corrupt(format!("entry {i}: {e}")))?;
            if file.is_dir() {
                continue;
            }

            let archive_name = file.name().to_string();
            let path = normalize_path(&archive_name);
            let declared = file.size();
            let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::corrupt(format!("{path}: {e}")))?;

            if data.len() as u64 != declared {
                return Err(Error::corrupt(format!(
                    "{path}: declared {declared} bytes but decompressed {}",
                    data.len()
                )));
            }

            if is_ignored(&path) {
                continue;
            }
            raw.push(SourceEntry { path, data });
            archive_names.push(archive_name);
        }

        let root_prefix = detect_root_prefix(&raw);
        if let Some(prefix) = &root_prefix {
            tracing::debug!("Re-rooting pack under {prefix:?}");
            for entry in &mut raw {
                if let Some(rest) = entry.path.strip_prefix(prefix.as_str()) {
                    entry.path = rest.to_string();
                }
            }
        }

        let mut entries = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());
        let mut duplicates = Vec::new();
        for (entry, archive_name) in raw.into_iter().zip(archive_names) {
            if index.contains_key(&entry.path) {
                tracing::debug!("Dropping {archive_name:?}, duplicate of {}", entry.path);
                duplicates.push(DuplicateEntry {
                    archive_name,
                    path: entry.path,
                });
                continue;
            }
            index.insert(entry.path.clone(), entries.len());
            entries.push(entry);
        }

        let (metadata, metadata_error) = match index.get(PACK_METADATA_PATH) {
            Some(&i) => match PackMetadata::parse(&entries[i].data) {
                Ok(meta) => (Some(meta), None),
                Err(e) => (None, Some(e.to_string())),
            },
            None => (None, None),
        };

        Ok(Self {
            entries,
            index,
            duplicates,
            metadata,
            metadata_error,
            root_prefix,
        })
    }

    /// `(path, size)` of every entry, in archive order
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|e| (e.path.as_str(), e.size()))
    }

    /// Full entries, in archive order
    pub fn iter(&self) -> std::slice::Iter<'_, SourceEntry> {
        self.entries.iter()
    }

    /// Read an entry by pack-relative path
    pub fn read(&self, path: &str) -> Result<&[u8]> {
        let normalized = normalize_path(path);
        self.index
            .get(&normalized)
            .map(|&i| self.entries[i].data.as_slice())
            .ok_or(Error::EntryNotFound(normalized))
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&normalize_path(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped because their path collided with an earlier entry
    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateEntry] {
        &self.duplicates
    }

    /// Files in the archive, kept or dropped as duplicates
    #[must_use]
    pub fn archive_len(&self) -> usize {
        self.entries.len() + self.duplicates.len()
    }

    /// Parsed `pack.mcmeta`, if present and well-formed
    #[must_use]
    pub fn metadata(&self) -> Option<&PackMetadata> {
        self.metadata.as_ref()
    }

    /// Why `pack.mcmeta` could not be parsed, if it was present but malformed
    #[must_use]
    pub fn metadata_error(&self) -> Option<&str> {
        self.metadata_error.as_deref()
    }

    /// Wrapping folder that was stripped from every path, if any
    #[must_use]
    pub fn root_prefix(&self) -> Option<&str> {
        self.root_prefix.as_deref()
    }
}

/// OS clutter that is never part of a pack
fn is_ignored(path: &str) -> bool {
    path.is_empty()
        || path.starts_with("__MACOSX/")
        || path == ".DS_Store"
        || path.ends_with("/.DS_Store")
        || path == "Thumbs.db"
        || path.ends_with("/Thumbs.db")
}

/// A single top-level folder holding `pack.mcmeta`, when the root has none
fn detect_root_prefix(entries: &[SourceEntry]) -> Option<String> {
    if entries.iter().any(|e| e.path == PACK_METADATA_PATH) {
        return None;
    }

    let mut candidates = entries.iter().filter_map(|e| {
        let (folder, file) = e.path.split_once('/')?;
        (file == PACK_METADATA_PATH).then(|| format!("{folder}/"))
    });
    let first = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const MCMETA: &[u8] = br#"{"pack": {"pack_format": 15, "description": "Test Pack"}}"#;

    #[test]
    fn test_open_lists_entries_in_order() {
        let bytes = zip_of(&[
            ("pack.mcmeta", MCMETA),
            ("assets/minecraft/textures/block/b.png", b"bb"),
            ("assets/minecraft/textures/block/a.png", b"a"),
        ]);
        let pack = SourcePack::open(&bytes).unwrap();

        let listed: Vec<_> = pack.entries().collect();
        assert_eq!(
            listed,
            vec![
                ("pack.mcmeta", MCMETA.len() as u64),
                ("assets/minecraft/textures/block/b.png", 2),
                ("assets/minecraft/textures/block/a.png", 1),
            ]
        );
        assert_eq!(pack.metadata().unwrap().description, "Test Pack");
        assert!(pack.root_prefix().is_none());
    }

    #[test]
    fn test_read_missing_entry() {
        let pack = SourcePack::open(&zip_of(&[("pack.mcmeta", MCMETA)])).unwrap();
        assert_eq!(pack.read("./pack.mcmeta").unwrap(), MCMETA);
        assert!(matches!(pack.read("pack.png"), Err(Error::EntryNotFound(p)) if p == "pack.png"));
    }

    #[test]
    fn test_truncated_archive_is_corrupt() {
        let bytes = zip_of(&[("pack.mcmeta", MCMETA)]);
        let truncated = &bytes[..bytes.len() - 10];
        assert!(matches!(
            SourcePack::open(truncated),
            Err(Error::ArchiveCorrupt { .. })
        ));
        assert!(matches!(
            SourcePack::open(b"definitely not a zip"),
            Err(Error::ArchiveCorrupt { .. })
        ));
    }

    #[test]
    fn test_declared_size_mismatch_is_corrupt() {
        let data: &[u8] = b"stored entry body";
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "credits.txt",
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
            )
            .unwrap();
        writer.write_all(data).unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Claim five more bytes than the entry holds, in both headers
        let claimed = (data.len() as u32 + 5).to_le_bytes();
        let local = find(&bytes, b"PK\x03\x04");
        bytes[local + 22..local + 26].copy_from_slice(&claimed);
        let central = find(&bytes, b"PK\x01\x02");
        bytes[central + 24..central + 28].copy_from_slice(&claimed);

        assert!(matches!(
            SourcePack::open(&bytes),
            Err(Error::ArchiveCorrupt { .. })
        ));
    }

    fn find(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap()
    }

    #[test]
    fn test_colliding_paths_are_recorded() {
        let bytes = zip_of(&[
            ("pack.mcmeta", MCMETA),
            ("credits.txt", b"first"),
            ("./credits.txt", b"second"),
            ("notes/a.txt", b"a"),
            ("notes\\a.txt", b"b"),
        ]);
        let pack = SourcePack::open(&bytes).unwrap();

        assert_eq!(pack.len(), 3);
        assert_eq!(pack.archive_len(), 5);
        assert_eq!(pack.read("credits.txt").unwrap(), b"first");
        assert_eq!(
            pack.duplicates(),
            &[
                DuplicateEntry {
                    archive_name: "./credits.txt".to_string(),
                    path: "credits.txt".to_string(),
                },
                DuplicateEntry {
                    archive_name: "notes\\a.txt".to_string(),
                    path: "notes/a.txt".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_wrapped_folder_is_rerooted() {
        let bytes = zip_of(&[
            ("My Pack/pack.mcmeta", MCMETA),
            ("My Pack/pack.png", b"icon"),
            ("__MACOSX/My Pack/._pack.png", b"junk"),
            ("My Pack/.DS_Store", b"junk"),
        ]);
        let pack = SourcePack::open(&bytes).unwrap();

        assert_eq!(pack.root_prefix(), Some("My Pack/"));
        assert_eq!(pack.read("pack.png").unwrap(), b"icon");
        assert_eq!(pack.len(), 2);
        assert!(pack.metadata().is_some());
    }

    #[test]
    fn test_malformed_metadata_is_kept_as_error() {
        let pack = SourcePack::open(&zip_of(&[("pack.mcmeta", b"{ nope")])).unwrap();
        assert!(pack.metadata().is_none());
        assert!(pack.metadata_error().is_some());
        assert!(pack.contains("pack.mcmeta"));
    }
}

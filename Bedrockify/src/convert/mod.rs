//! Conversion orchestrator
//!
//! Drives one run over a Java pack: read the archive, resolve every entry,
//! transform and accumulate mapped assets in source order, then build the
//! manifest and seal the Bedrock archive. Only a corrupt input or a failed
//! seal end a run early; everything else is reported in the result.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod cancel;
mod target;
mod types;

use rayon::prelude::*;

use crate::archive::{ArchiveWriter, PACK_METADATA_PATH, SourceEntry, SourcePack};
use crate::error::Error;
use crate::manifest::ManifestBuilder;
use crate::mapping::{
    AssetKind, IdentifierMapper, MappingTable, Resolution, ResolvedAsset, ResolvedTarget,
};
use crate::options::ConversionOptions;
use crate::texture::{self, AnimationMeta};

pub use cancel::{CancelToken, Cancellation, NeverCancel};
pub use target::{InsertOutcome, MERGEABLE_TARGETS, TargetPack, is_mergeable};
pub use types::{
    AssetError, AssetWarning, ConversionOutcome, ConversionProgress, ConversionProgressCallback, ConversionResult, ConversionState, ConversionSummary,
};

/// Sidecar suffix of Java animated textures
const ANIMATION_SUFFIX: &str = ".mcmeta";

/// One source entry with its mapping decision
struct PlannedEntry<'p> {
    entry: &'p SourceEntry,
    resolution: Resolution,
}

/// What processing one entry produced, before accumulation
#[derive(Default)]
struct EntryOutput {
    assets: Vec<ResolvedAsset>,
    warnings: Vec<AssetWarning>,
    errors: Vec<AssetError>,
}

/// Converts Java packs using a shared mapping table
#[derive(Debug, Clone)]
pub struct Converter<'t> {
    table: &'t MappingTable,
    options: ConversionOptions,
}

impl<'t> Converter<'t> {
    #[must_use]
    pub fn new(table: &'t MappingTable, options: ConversionOptions) -> Self {
        Self { table, options }
    }

    /// Convert without progress reporting or cancellation
    #[must_use]
    pub fn convert(&self, archive: &[u8], name: Option<&str>) -> ConversionOutcome {
        self.convert_with_progress(archive, name, &|_| {}, &NeverCancel)
    }

    /// Convert a Java pack, reporting progress after every entry
    ///
    /// `name` overrides the pack name taken from `pack.mcmeta`. `cancel` is
    /// polled between entries; once it reports true the run stops with
    /// [`ConversionOutcome::Cancelled`] and no further progress is reported.
    pub fn convert_with_progress(
        &self,
        archive: &[u8],
        name: Option<&str>,
        progress: ConversionProgressCallback,
        cancel: &dyn Cancellation,
    ) -> ConversionOutcome {
        let mut run = RunState::default();

        // Reading
        run.enter(ConversionState::Reading);
        if cancel.is_cancelled() {
            return run.cancelled();
        }
        let pack = match SourcePack::open(archive) {
            Ok(pack) => pack,
            Err(e) => return run.failed(e),
        };
        tracing::info!(
            "Converting pack with {} entries ({} input bytes)",
            pack.len(),
            archive.len()
        );

        // Mapping
        run.enter(ConversionState::Mapping);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        self.check_metadata(&pack, &mut warnings);
        for duplicate in pack.duplicates() {
            let warning = AssetWarning::new(
                &duplicate.archive_name,
                format!("duplicate of {} after normalization", duplicate.path),
            );
            tracing::warn!("{}: {}", warning.source_path, warning.reason);
            warnings.push(warning);
        }

        let mapper = IdentifierMapper::new(self.table, &self.options.required_assets);
        let planned: Vec<PlannedEntry<'_>> = pack
            .iter()
            .filter(|entry| entry.path != PACK_METADATA_PATH)
            .map(|entry| PlannedEntry {
                entry,
                resolution: mapper.classify(&entry.path),
            })
            .collect();

        for required in &self.options.required_assets {
            if !pack.contains(required) {
                errors.push(AssetError::required_missing(required));
            }
        }
        if cancel.is_cancelled() {
            return run.cancelled();
        }

        // Transforming
        run.enter(ConversionState::Transforming);
        let total = planned.len();
        let batch_size = if self.options.parallel_transforms {
            self.options.batch_size.max(1)
        } else {
            1
        };

        let mut target = TargetPack::new();
        let mut assets = Vec::new();
        let mut processed = 0;

        for batch in planned.chunks(batch_size) {
            let outputs: Vec<EntryOutput> = if batch.len() > 1 {
                batch
                    .par_iter()
                    .map(|planned| self.process_entry(&pack, mapper, planned))
                    .collect()
            } else {
                batch
                    .iter()
                    .map(|planned| self.process_entry(&pack, mapper, planned))
                    .collect()
            };

            // Accumulate in source order regardless of completion order
            for (planned, output) in batch.iter().zip(outputs) {
                accumulate(output, &mut target, &mut assets, &mut warnings, &mut errors);
                processed += 1;
                progress(&ConversionProgress::with_file(
                    processed,
                    total,
                    planned.entry.path.as_str(),
                ));
                if cancel.is_cancelled() {
                    return run.cancelled();
                }
            }
        }

        // Finalizing
        run.enter(ConversionState::Finalizing);
        let mut builder = ManifestBuilder::new(self.table.schema_version())
            .version(self.options.pack_version)
            .fallback_name(self.options.fallback_name.as_str());
        if let Some(name) = name {
            builder = builder.name(name);
        }
        let manifest = builder.build(pack.metadata(), &assets);

        let archive = match ArchiveWriter::from_options(&self.options).seal(target.entries(), &manifest)
        {
            Ok(bytes) => bytes,
            Err(e) => return run.failed(e),
        };

        let mut summary = ConversionSummary {
            entries_seen: pack.archive_len(),
            output_entries: target.len() + 1,
            warnings: warnings.len(),
            errors: errors.len(),
            ..ConversionSummary::default()
        };
        for asset in &assets {
            *summary.assets_written.entry(asset.kind).or_default() += 1;
        }

        run.enter(ConversionState::Done);
        tracing::info!(
            "Converted {:?}: {} output entries, {} warnings, {} errors, {} bytes",
            manifest.header.name,
            summary.output_entries,
            summary.warnings,
            summary.errors,
            archive.len()
        );

        ConversionOutcome::Done(ConversionResult {
            archive,
            manifest,
            warnings,
            errors,
            summary,
        })
    }

    fn check_metadata(&self, pack: &SourcePack, warnings: &mut Vec<AssetWarning>) {
        if let Some(reason) = pack.metadata_error() {
            warnings.push(AssetWarning::new(
                PACK_METADATA_PATH,
                format!("malformed pack metadata, using fallbacks: {reason}"),
            ));
        } else if pack.metadata().is_none() {
            warnings.push(AssetWarning::new(
                PACK_METADATA_PATH,
                "pack has no metadata file, using fallbacks",
            ));
        }
    }

    /// Map and transform one entry; touches no run state
    fn process_entry(
        &self,
        pack: &SourcePack,
        mapper: IdentifierMapper<'_>,
        planned: &PlannedEntry<'_>,
    ) -> EntryOutput {
        let source_path = planned.entry.path.as_str();
        let mut output = EntryOutput::default();

        let targets = match &planned.resolution {
            Resolution::Mapped(targets) => targets,
            Resolution::Unmapped(unmapped) => {
                output
                    .warnings
                    .push(AssetWarning::new(&unmapped.source_path, &unmapped.reason));
                return output;
            }
            Resolution::RequiredUnmapped(unmapped) => {
                output.errors.push(AssetError {
                    source_path: Some(unmapped.source_path.clone()),
                    kind: crate::error::ErrorKind::RequiredAssetMissing,
                    reason: unmapped.reason.clone(),
                });
                return output;
            }
        };

        for resolved in targets {
            let asset = ResolvedAsset::new(source_path, resolved, planned.entry.data.clone());
            let result = if resolved.kind == AssetKind::AnimationMetadata {
                flipbook_asset(pack, mapper, asset)
            } else {
                texture::transform_with_hint(resolved.kind, resolved.hint, &planned.entry.data)
                    .map(|bytes| Ok(asset.with_output(bytes)))
            };

            match result {
                Ok(Ok(asset)) => {
                    tracing::debug!("{source_path} -> {} ({})", asset.target_path, asset.kind);
                    output.assets.push(asset);
                }
                Ok(Err(skipped)) => output
                    .warnings
                    .push(AssetWarning::new(source_path, skipped.reason())),
                Err(e) => output.errors.push(AssetError::from_error(source_path, &e)),
            }
        }

        output
    }
}

/// Why a sidecar produced no flipbook record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlipbookSkip {
    /// Texture absent from the pack or mapped to no texture target
    NoTexture,
    /// Texture present but it will not be in the output
    TextureFailed,
}

impl FlipbookSkip {
    fn reason(self) -> &'static str {
        match self {
            Self::NoTexture => "animation metadata has no mapped texture beside it",
            Self::TextureFailed => "texture beside this animation metadata could not be converted",
        }
    }
}

/// Turn a `.png.mcmeta` sidecar into flipbook records for its texture's targets
fn flipbook_asset(
    pack: &SourcePack,
    mapper: IdentifierMapper<'_>,
    asset: ResolvedAsset,
) -> crate::error::Result<Result<ResolvedAsset, FlipbookSkip>> {
    let canonical = texture::transform(AssetKind::AnimationMetadata, &asset.data)?;
    let meta = AnimationMeta::from_canonical_json(&canonical)?;

    let Some(texture_path) = asset.source_path.strip_suffix(ANIMATION_SUFFIX) else {
        return Ok(Err(FlipbookSkip::NoTexture));
    };
    if !pack.contains(texture_path) {
        return Ok(Err(FlipbookSkip::NoTexture));
    }

    let texture_targets: Vec<ResolvedTarget> = mapper
        .resolve(texture_path)
        .into_iter()
        .filter(|target| target.kind.is_texture())
        .collect();
    let Some(first) = texture_targets.first() else {
        return Ok(Err(FlipbookSkip::NoTexture));
    };

    // The texture entry reports its own error; only the record is dropped here
    if texture::transform_with_hint(first.kind, first.hint, pack.read(texture_path)?).is_err() {
        return Ok(Err(FlipbookSkip::TextureFailed));
    }

    let target_paths: Vec<String> = texture_targets
        .into_iter()
        .map(|target| target.target_path)
        .collect();
    let fragment = texture::flipbook_fragment(&meta, &target_paths)?;
    Ok(Ok(asset.with_output(fragment)))
}

/// Fold one entry's output into the run, in source order
fn accumulate(
    output: EntryOutput,
    target: &mut TargetPack,
    assets: &mut Vec<ResolvedAsset>,
    warnings: &mut Vec<AssetWarning>,
    errors: &mut Vec<AssetError>,
) {
    for warning in output.warnings {
        tracing::warn!("{}: {}", warning.source_path, warning.reason);
        warnings.push(warning);
    }
    for error in output.errors {
        tracing::warn!(
            "{}: {}",
            error.source_path.as_deref().unwrap_or("<pack>"),
            error.reason
        );
        errors.push(error);
    }

    for mut asset in output.assets {
        // The target pack owns the bytes from here on
        let data = std::mem::take(&mut asset.data);
        match target.insert(&asset.target_path, &asset.source_path, data) {
            Ok(InsertOutcome::Added | InsertOutcome::Merged) => assets.push(asset),
            Ok(InsertOutcome::Overwrote(previous)) => {
                let warning = AssetWarning::new(
                    &asset.source_path,
                    format!("overwrites {} written from {previous}", asset.target_path),
                );
                tracing::warn!("{}: {}", warning.source_path, warning.reason);
                warnings.push(warning);
                // Only the latest writer of a target counts as written
                assets.retain(|written| written.target_path != asset.target_path);
                assets.push(asset);
            }
            Err(e) => {
                let error = AssetError::from_error(&asset.source_path, &e);
                tracing::warn!("{}: {}", asset.source_path, error.reason);
                errors.push(error);
            }
        }
    }
}

/// Tracks the state machine of a single run
#[derive(Debug, Default)]
struct RunState {
    state: ConversionState,
}

impl RunState {
    fn enter(&mut self, next: ConversionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state.as_str(),
            next.as_str()
        );
        tracing::debug!("Run state {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
    }

    fn failed(&mut self, error: Error) -> ConversionOutcome {
        self.enter(ConversionState::Failed);
        tracing::warn!("Conversion failed: {error}");
        ConversionOutcome::Failed(error)
    }

    fn cancelled(&mut self) -> ConversionOutcome {
        self.enter(ConversionState::Cancelled);
        tracing::info!("Conversion cancelled");
        ConversionOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingEntry, TransformHint};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn zip_of(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn table() -> MappingTable {
        let entry = |source: &str, target: &str, kind| MappingEntry {
            source: source.to_string(),
            targets: vec![target.to_string()],
            kind,
            hint: TransformHint::None,
        };
        MappingTable::from_entries(
            3,
            vec![
                entry("sounds/*.ogg", "sounds/${1}.ogg", AssetKind::Passthrough),
                entry("texts/*.txt", "texts/${1}.txt", AssetKind::Passthrough),
                entry("dup/*.txt", "texts/same.txt", AssetKind::Passthrough),
            ],
        )
        .unwrap()
    }

    const MCMETA: &[u8] = br#"{"pack": {"pack_format": 15, "description": "Unit"}}"#;

    #[test]
    fn test_passthrough_run() {
        let table = table();
        let input = zip_of(&[
            ("pack.mcmeta", MCMETA.to_vec()),
            ("sounds/step.ogg", b"OggS".to_vec()),
            ("readme.md", b"hello".to_vec()),
        ]);

        let result = Converter::new(&table, ConversionOptions::default())
            .convert(&input, None)
            .into_result()
            .unwrap();

        assert_eq!(result.manifest.header.name, "Unit");
        assert_eq!(result.warnings, vec![AssetWarning::new(
            "readme.md",
            "no Bedrock mapping for this asset"
        )]);
        assert!(result.errors.is_empty());
        assert_eq!(result.summary.entries_seen, 3);
        assert_eq!(result.summary.output_entries, 2);
        assert_eq!(result.summary.assets_written.get(&AssetKind::Passthrough), Some(&1));
    }

    #[test]
    fn test_overwrite_is_a_warning() {
        let table = table();
        let input = zip_of(&[
            ("pack.mcmeta", MCMETA.to_vec()),
            ("texts/same.txt", b"first".to_vec()),
            ("dup/other.txt", b"second".to_vec()),
        ]);
        let result = Converter::new(&table, ConversionOptions::default())
            .convert(&input, None)
            .into_result()
            .unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].source_path, "dup/other.txt");
        assert!(result.warnings[0].reason.contains("texts/same.txt"));
        assert_eq!(result.summary.output_entries, 2);
        assert_eq!(result.summary.total_written(), 1);
    }

    #[test]
    fn test_missing_metadata_and_required_assets() {
        let table = table();
        let input = zip_of(&[("sounds/a.ogg", b"a".to_vec()), ("notes.txt", b"n".to_vec())]);
        let options = ConversionOptions::default()
            .with_required_asset("pack.png")
            .with_required_asset("notes.txt");

        let result = Converter::new(&table, options)
            .convert(&input, Some("Named"))
            .into_result()
            .unwrap();

        assert_eq!(result.manifest.header.name, "Named");
        assert_eq!(result.warnings[0].source_path, PACK_METADATA_PATH);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].source_path, None);
        assert_eq!(result.errors[1].source_path.as_deref(), Some("notes.txt"));
        assert!(result
            .errors
            .iter()
            .all(|e| e.kind == crate::error::ErrorKind::RequiredAssetMissing));
    }

    #[test]
    fn test_corrupt_input_fails() {
        let table = table();
        let outcome = Converter::new(&table, ConversionOptions::default()).convert(b"PK\x05\x06", None);
        assert_eq!(outcome.state(), ConversionState::Failed);
        assert!(matches!(outcome, ConversionOutcome::Failed(Error::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_cancel_before_start() {
        let table = table();
        let input = zip_of(&[("sounds/a.ogg", b"a".to_vec())]);
        let token = CancelToken::new();
        token.cancel();
        let outcome = Converter::new(&table, ConversionOptions::default())
            .convert_with_progress(&input, None, &|_| panic!("no progress expected"), &token);
        assert_eq!(outcome.state(), ConversionState::Cancelled);
    }
}

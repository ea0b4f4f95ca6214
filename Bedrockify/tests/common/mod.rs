//! Shared helpers for integration tests: in-memory packs and PNGs

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::sync::Once;

use image::codecs::png::PngEncoder;
use image::{Rgba, RgbaImage};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

pub const BLOCK_DIR: &str = "assets/minecraft/textures/block";
pub const ITEM_DIR: &str = "assets/minecraft/textures/item";

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// `pack.mcmeta` bytes with the given description
pub fn mcmeta(description: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "pack": {"pack_format": 15, "description": description}
    }))
    .unwrap()
}

/// A solid-colored PNG
pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut out)).unwrap();
    out
}

/// Zip `files` in the given order
pub fn zip_of(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Builder for Java packs
#[derive(Default)]
pub struct PackBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl PackBuilder {
    pub fn new(description: &str) -> Self {
        Self::default().file("pack.mcmeta", mcmeta(description))
    }

    pub fn file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.push((path.into(), data));
        self
    }

    /// A 16x16 block texture under `block/`
    pub fn block(self, name: &str) -> Self {
        self.file(format!("{BLOCK_DIR}/{name}.png"), png(16, 16, [120, 90, 60, 255]))
    }

    pub fn build(&self) -> Vec<u8> {
        zip_of(&self.files)
    }

    /// Same files, all under one wrapping folder
    pub fn build_wrapped(&self, folder: &str) -> Vec<u8> {
        let wrapped: Vec<(String, Vec<u8>)> = self
            .files
            .iter()
            .map(|(path, data)| (format!("{folder}/{path}"), data.clone()))
            .collect();
        zip_of(&wrapped)
    }
}

/// Entry names of an archive, in archive order
pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Contents of one entry
pub fn read_entry(archive: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

//! Per-asset content transforms
//!
//! Textures are decoded as PNG, normalized to 8-bit RGBA and re-encoded
//! with fixed encoder settings, so the output is a pure function of the
//! asset kind, hint and input bytes. Passthrough assets are copied as-is
//! and animation sidecars are canonicalized.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod animation;

use image::codecs::png::PngEncoder;
use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};
use crate::mapping::{AssetKind, TransformHint};

pub use animation::{AnimationMeta, FlipbookRecord, flipbook_fragment};

/// Transform an asset without a hint
///
/// # Errors
/// Returns [`Error::UnsupportedAssetFormat`] if a texture is not a decodable PNG
/// or a sidecar is not valid animation metadata.
pub fn transform(kind: AssetKind, bytes: &[u8]) -> Result<Vec<u8>> {
    transform_with_hint(kind, TransformHint::None, bytes)
}

/// Transform an asset, applying the mapping entry's hint to textures
///
/// # Errors
/// Returns [`Error::UnsupportedAssetFormat`] if a texture is not a decodable PNG
/// or a sidecar is not valid animation metadata.
pub fn transform_with_hint(kind: AssetKind, hint: TransformHint, bytes: &[u8]) -> Result<Vec<u8>> {
    match kind {
        AssetKind::Passthrough => Ok(bytes.to_vec()),
        AssetKind::AnimationMetadata => AnimationMeta::parse(bytes)?.to_canonical_json(),
        AssetKind::BlockTexture
        | AssetKind::ItemTexture
        | AssetKind::EntityTexture
        | AssetKind::UiTexture => {
            let img = decode_png(bytes)?;
            let img = apply_hint(img, hint);
            encode_png(&img)
        }
    }
}

/// Decode PNG bytes into RGBA8
fn decode_png(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| Error::unsupported(format!("not a decodable PNG: {e}")))?;
    Ok(img.to_rgba8())
}

fn apply_hint(mut img: RgbaImage, hint: TransformHint) -> RgbaImage {
    match hint {
        TransformHint::None => img,
        TransformHint::Opaque => {
            for pixel in img.pixels_mut() {
                pixel[3] = u8::MAX;
            }
            img
        }
        TransformHint::FirstFrame => {
            let (width, height) = img.dimensions();
            if width > 0 && height > width && height % width == 0 {
                image::imageops::crop_imm(&img, 0, 0, width, width).to_image()
            } else {
                img
            }
        }
    }
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    let encoder = PngEncoder::new(&mut png_data);
    img.write_with_encoder(encoder)
        .map_err(|e| Error::unsupported(format!("failed to encode PNG: {e}")))?;
    Ok(png_data)
}

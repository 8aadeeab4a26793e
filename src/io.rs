//! Image decode/encode for the engine's outer edge.
//!
//! Decoding is the host's suspend point: everything inside the engine works
//! on already-decoded `RgbaImage`s, so these helpers are the only place a
//! codec can fail. Exports are lossless PNG.

use std::io::Cursor;
use std::path::Path;

use image::{ImageOutputFormat, RgbaImage};

/// Decode a page image from disk into RGBA. Supports PNG, WebP and JPEG
/// (book pages ship as WebP).
pub fn decode_image(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("could not decode '{}': {}", path.display(), e))?;
    Ok(img.to_rgba8())
}

/// Decode a page image from an in-memory byte buffer (hosts that fetch
/// pages over the network hand bytes, not paths).
pub fn decode_image_bytes(bytes: &[u8]) -> Result<RgbaImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("could not decode bytes: {}", e))?;
    Ok(img.to_rgba8())
}

/// Encode a composed bitmap to PNG bytes in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| format!("png encode failed: {}", e))?;
    Ok(bytes)
}

/// Encode to PNG and write to disk (CLI export path).
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), String> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes)
        .map_err(|e| format!("could not write '{}': {}", path.display(), e))
}

//! Export compositor.
//!
//! Merges the three layers of a coloring session — background art, the
//! fill-painted working raster, and the vector strokes — into one RGBA
//! bitmap at the caller's export size. Stacking order is fixed:
//! background first, fill raster second, strokes last.
//!
//! The export size is whatever the host asks for *at the moment of export*
//! and may differ from the native working size (a responsive container may
//! have resized between drawing and exporting). Raster layers are resampled
//! to the target before the merge; strokes rasterize directly at target
//! size since they are still vector at this point.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;

use crate::canvas::PixelBuffer;
use crate::stroke::StrokeLayer;

/// Resample a raster layer to the export size. Same-size inputs are
/// returned as-is so a native-size export round-trips byte-exactly.
fn resample(image: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    if image.dimensions() == (target_w, target_h) {
        image.clone()
    } else {
        imageops::resize(image, target_w, target_h, FilterType::Lanczos3)
    }
}

/// Straight-alpha source-over blend with integer math. Fully opaque source
/// replaces the destination outright; fully transparent source leaves it
/// untouched.
#[inline]
fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst[3] as u32;
    let inv = 255 - sa;
    // out_a in 0..=255; da * inv is rounded at /255.
    let da_scaled = (da * inv + 127) / 255;
    let out_a = sa + da_scaled;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src[c] as u32;
        let d = dst[c] as u32;
        // Straight alpha: weight each channel by its layer's contribution.
        out[c] = ((s * sa + d * da_scaled + out_a / 2) / out_a) as u8;
    }
    out[3] = out_a as u8;
    out
}

/// Compose background + fill raster + strokes into a `target_w`×`target_h`
/// bitmap. The caller must only pass a background whose decode has
/// completed; the engine never sees half-decoded images because a decoded
/// `RgbaImage` is the only accepted input type.
pub fn compose(
    background: &RgbaImage,
    fill: &PixelBuffer,
    strokes: &StrokeLayer,
    target_w: u32,
    target_h: u32,
) -> RgbaImage {
    let target_w = target_w.max(1);
    let target_h = target_h.max(1);

    let mut out = resample(background, target_w, target_h);
    let fill_layer = resample(&fill.to_image(), target_w, target_h);
    let stroke_layer = strokes.render(target_w, target_h);

    let row_len = target_w as usize * 4;
    let raster: &mut [u8] = &mut out;
    raster
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let fill_row = &fill_layer.as_raw()[y * row_len..(y + 1) * row_len];
            let stroke_row = &stroke_layer.as_raw()[y * row_len..(y + 1) * row_len];
            for x in 0..target_w as usize {
                let o = x * 4;
                let mut px = [row[o], row[o + 1], row[o + 2], row[o + 3]];
                px = blend_over(px, [fill_row[o], fill_row[o + 1], fill_row[o + 2], fill_row[o + 3]]);
                px = blend_over(
                    px,
                    [stroke_row[o], stroke_row[o + 1], stroke_row[o + 2], stroke_row[o + 3]],
                );
                row[o..o + 4].copy_from_slice(&px);
            }
        });
    out
}

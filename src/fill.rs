//! Scanline flood fill — the core region-coloring algorithm.
//!
//! Given a seed pixel and a target color, repaints every pixel reachable
//! from the seed through 4-connected neighbors whose color matches the
//! seed's *original* color within the tolerance, stopping at the line art.
//!
//! This is the column-scan variant of the classic stack fill: each popped
//! seed first climbs to the topmost matching pixel of its column, then
//! paints downward, seeding the left and right columns edge-triggered (one
//! push per contiguous matching run). Compared to naive 4-direction
//! recursion this keeps the stack small on large flat regions and never
//! risks blowing the call stack.

use image::Rgba;

use crate::canvas::PixelBuffer;
use crate::color::{FillColor, channels_match};

/// What a fill call actually did. Never an error: out-of-bounds seeds paint
/// nothing and budget exhaustion leaves a visually truncated region — both
/// are accepted degradations, not failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Pixels painted (equals pixels visited — every visit paints).
    pub painted: usize,
    /// True when the fill stopped because it hit `max_pixels`.
    pub budget_exhausted: bool,
}

#[inline]
fn pixel_at(raster: &[u8], idx: usize) -> Rgba<u8> {
    let o = idx * 4;
    Rgba([raster[o], raster[o + 1], raster[o + 2], raster[o + 3]])
}

/// Flood-fill `buffer` from `seed` with `color`.
///
/// The match reference is captured from the seed *before* any write and
/// stays fixed for the whole operation — the raster is being overwritten
/// with the fill color as the fill proceeds, so matching against the live
/// buffer would self-invalidate. A seed landing on an anti-aliased boundary
/// pixel still fills: it trivially matches its own captured color.
///
/// All writes go to a scratch copy that is committed back to the buffer in
/// one `replace_raw` once the stack empties or the budget trips.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed_x: u32,
    seed_y: u32,
    color: FillColor,
    tolerance: u8,
    max_pixels: usize,
) -> FillOutcome {
    // Seeds outside the canvas are rejected before any work happens.
    if !buffer.in_bounds(seed_x, seed_y) || max_pixels == 0 {
        return FillOutcome::default();
    }

    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    let mut scratch = buffer.raw().to_vec();

    let original = pixel_at(&scratch, seed_y as usize * w + seed_x as usize);
    let fill = color.to_rgba();

    let matches = |raster: &[u8], x: usize, y: usize| -> bool {
        channels_match(pixel_at(raster, y * w + x), original, tolerance)
    };

    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(64);
    stack.push((seed_x as usize, seed_y as usize));

    let mut painted = 0usize;
    let mut budget_exhausted = false;

    'fill: while let Some((x, mut y)) = stack.pop() {
        // Climb to the topmost matching pixel of this column.
        while y > 0 && matches(&scratch, x, y - 1) {
            y -= 1;
        }

        // Walk down, painting, and seed the side columns edge-triggered:
        // push on the transition into a matching run, once per run.
        let mut reach_left = false;
        let mut reach_right = false;
        while y < h && matches(&scratch, x, y) {
            let o = (y * w + x) * 4;
            scratch[o..o + 4].copy_from_slice(&fill.0);
            painted += 1;
            if painted >= max_pixels {
                budget_exhausted = true;
                break 'fill;
            }

            if x > 0 {
                if matches(&scratch, x - 1, y) {
                    if !reach_left {
                        stack.push((x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }
            if x + 1 < w {
                if matches(&scratch, x + 1, y) {
                    if !reach_right {
                        stack.push((x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }
            y += 1;
        }
    }

    // Single commit; mid-fill the public buffer was never half-written.
    buffer.replace_raw(scratch);
    FillOutcome {
        painted,
        budget_exhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{DEFAULT_FILL_BUDGET, DEFAULT_TOLERANCE};
    use image::RgbaImage;

    const RED: FillColor = FillColor::new(255, 0, 0);

    fn uniform(w: u32, h: u32, color: [u8; 4]) -> PixelBuffer {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        PixelBuffer::from_image(&img)
    }

    fn count_color(buf: &PixelBuffer, color: Rgba<u8>) -> usize {
        let mut n = 0;
        for y in 0..buf.height() {
            for x in 0..buf.width() {
                if buf.get(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn isolated_seed_paints_exactly_one_pixel() {
        // Seed color differs from every 4-connected neighbor beyond tolerance.
        let mut buf = uniform(5, 5, [255, 255, 255, 255]);
        buf.set(2, 2, Rgba([0, 0, 0, 255]));
        let outcome = flood_fill(&mut buf, 2, 2, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 1);
        assert!(!outcome.budget_exhausted);
        assert_eq!(buf.get(2, 2), Some(RED.to_rgba()));
        assert_eq!(count_color(&buf, RED.to_rgba()), 1);
    }

    #[test]
    fn uniform_buffer_fills_entirely() {
        let mut buf = uniform(16, 9, [200, 200, 200, 255]);
        let outcome = flood_fill(&mut buf, 7, 3, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 16 * 9);
        assert!(!outcome.budget_exhausted);
        assert_eq!(count_color(&buf, RED.to_rgba()), 16 * 9);
    }

    #[test]
    fn uniform_buffer_respects_budget() {
        for budget in [1usize, 4, 50, 16 * 9, 10_000] {
            let mut buf = uniform(16, 9, [200, 200, 200, 255]);
            let outcome = flood_fill(&mut buf, 0, 0, RED, DEFAULT_TOLERANCE, budget);
            let expected = budget.min(16 * 9);
            assert_eq!(outcome.painted, expected);
            assert_eq!(outcome.budget_exhausted, budget <= 16 * 9);
            assert_eq!(count_color(&buf, RED.to_rgba()), expected);
        }
    }

    #[test]
    fn budget_four_on_three_by_three() {
        // Seed at the corner of a uniform 3×3 with a budget of 4: exactly
        // four pixels painted, five untouched.
        let mut buf = uniform(3, 3, [255, 255, 255, 255]);
        let outcome = flood_fill(&mut buf, 0, 0, RED, DEFAULT_TOLERANCE, 4);
        assert_eq!(outcome.painted, 4);
        assert!(outcome.budget_exhausted);
        assert_eq!(count_color(&buf, RED.to_rgba()), 4);
        assert_eq!(count_color(&buf, Rgba([255, 255, 255, 255])), 5);
    }

    #[test]
    fn dividing_line_confines_fill() {
        // 10×10 white page with a black column at x = 5. Filling at (2, 2)
        // paints only the 5×10 left block; the line and the right block
        // stay untouched.
        let mut buf = uniform(10, 10, [255, 255, 255, 255]);
        for y in 0..10 {
            buf.set(5, y, Rgba([0, 0, 0, 255]));
        }
        let outcome = flood_fill(&mut buf, 2, 2, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 50);
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x < 5 {
                    RED.to_rgba()
                } else if x == 5 {
                    Rgba([0, 0, 0, 255])
                } else {
                    Rgba([255, 255, 255, 255])
                };
                assert_eq!(buf.get(x, y), Some(expected), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn anti_aliased_boundary_seed_still_fills() {
        // A boundary pixel whose neighbors all sit just inside tolerance of
        // it: the captured original is the seed itself, which trivially
        // matches, so clicking the soft edge of a line still fills.
        let mut buf = uniform(3, 1, [120, 120, 120, 255]);
        buf.set(1, 0, Rgba([100, 100, 100, 255]));
        let outcome = flood_fill(&mut buf, 1, 0, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 3);
    }

    #[test]
    fn out_of_bounds_seed_is_a_no_op() {
        let mut buf = uniform(4, 4, [255, 255, 255, 255]);
        let before = buf.clone();
        let outcome = flood_fill(&mut buf, 4, 0, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome, FillOutcome::default());
        assert_eq!(buf, before);
        let outcome = flood_fill(&mut buf, 0, 100, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn painted_alpha_is_forced_opaque() {
        let mut buf = uniform(2, 2, [10, 10, 10, 0]);
        flood_fill(&mut buf, 0, 0, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(buf.get(x, y).unwrap().0[3], 255);
            }
        }
    }

    #[test]
    fn fill_color_within_tolerance_terminates_via_budget() {
        // Filling white with near-white: painted pixels still match the
        // original, so only the budget guarantees termination.
        let mut buf = uniform(8, 8, [255, 255, 255, 255]);
        let near_white = FillColor::new(250, 250, 250);
        let outcome = flood_fill(&mut buf, 3, 3, near_white, DEFAULT_TOLERANCE, 500);
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.painted, 500);
    }

    #[test]
    fn u_shaped_region_fills_around_the_bend() {
        // Vertical wall from the top at x = 2 leaves a gap at the bottom
        // row; the fill must reach the far side through it.
        let mut buf = uniform(5, 5, [255, 255, 255, 255]);
        for y in 0..4 {
            buf.set(2, y, Rgba([0, 0, 0, 255]));
        }
        let outcome = flood_fill(&mut buf, 0, 0, RED, DEFAULT_TOLERANCE, DEFAULT_FILL_BUDGET);
        assert_eq!(outcome.painted, 25 - 4);
        assert_eq!(buf.get(4, 0), Some(RED.to_rgba()));
    }
}

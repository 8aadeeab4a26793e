//! Freehand stroke layer.
//!
//! Pointer drags are captured as vector paths in native buffer coordinates
//! and stay vector until export, so strokes survive a resize of the export
//! target without resampling artifacts and can be cleared without touching
//! the fill raster. Paths are append-only during a session; `clear()` drops
//! them wholesale.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::FillColor;

/// One sample of a pointer drag, in native buffer coordinates. The host is
/// responsible for mapping display coordinates to buffer coordinates before
/// handing samples in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single continuous drawing gesture: ordered points plus style.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrokePath {
    pub points: Vec<StrokePoint>,
    pub color: FillColor,
    pub width: f32,
}

/// All strokes of the active session, plus the gesture in progress.
#[derive(Clone, Debug)]
pub struct StrokeLayer {
    native_w: u32,
    native_h: u32,
    paths: Vec<StrokePath>,
    active: Option<StrokePath>,
}

impl StrokeLayer {
    /// Create an empty layer sized to the working buffer.
    pub fn new(native_w: u32, native_h: u32) -> Self {
        Self {
            native_w: native_w.max(1),
            native_h: native_h.max(1),
            paths: Vec::new(),
            active: None,
        }
    }

    /// Start a new gesture. An unfinished previous gesture is ended first
    /// rather than lost — pointer-up events can go missing on leave/cancel.
    pub fn begin_stroke(&mut self, color: FillColor, width: f32) {
        if self.active.is_some() {
            self.end_stroke();
        }
        self.active = Some(StrokePath {
            points: Vec::new(),
            color,
            width: width.max(0.1),
        });
    }

    /// Append a drag sample to the gesture in progress. Ignored when no
    /// gesture is active (stray move events).
    pub fn extend_stroke(&mut self, point: StrokePoint) {
        if let Some(ref mut path) = self.active {
            path.points.push(point);
        }
    }

    /// Finish the gesture in progress. Gestures that never produced a
    /// sample are discarded.
    pub fn end_stroke(&mut self) {
        if let Some(path) = self.active.take()
            && !path.points.is_empty()
        {
            self.paths.push(path);
        }
    }

    /// Drop every recorded path, including any gesture in progress.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.active = None;
    }

    /// Finished paths, in draw order.
    pub fn paths(&self) -> &[StrokePath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.active.is_none()
    }

    /// Restore paths from a saved snapshot.
    pub fn restore(native_w: u32, native_h: u32, paths: Vec<StrokePath>) -> Self {
        let mut layer = Self::new(native_w, native_h);
        layer.paths = paths;
        layer
    }

    /// Rasterize every recorded path (including the gesture in progress, so
    /// a mid-drag export shows what the user sees) onto a transparent RGBA
    /// raster of the given size. Coordinates scale by target/native; stroke
    /// width scales by the average of the two axis ratios.
    pub fn render(&self, target_w: u32, target_h: u32) -> RgbaImage {
        let target_w = target_w.max(1);
        let target_h = target_h.max(1);
        let mut raster = RgbaImage::new(target_w, target_h);

        let sx = target_w as f32 / self.native_w as f32;
        let sy = target_h as f32 / self.native_h as f32;
        let width_scale = (sx + sy) / 2.0;

        for path in self.paths.iter().chain(self.active.iter()) {
            let radius = (path.width * width_scale / 2.0).max(0.5);
            let color = path.color.to_rgba();
            if path.points.len() == 1 {
                let p = path.points[0];
                stamp_circle(&mut raster, p.x * sx, p.y * sy, radius, color);
                continue;
            }
            for pair in path.points.windows(2) {
                stamp_segment(
                    &mut raster,
                    (pair[0].x * sx, pair[0].y * sy),
                    (pair[1].x * sx, pair[1].y * sy),
                    radius,
                    color,
                );
            }
        }
        raster
    }
}

/// Stamp filled circles along a segment with dense per-pixel stepping, the
/// same scheme the interactive brush uses for smooth lines.
fn stamp_segment(
    raster: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < 0.1 {
        stamp_circle(raster, start.0, start.1, radius, color);
        return;
    }
    let steps = distance.ceil() as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp_circle(raster, start.0 + dx * t, start.1 + dy * t, radius, color);
    }
}

/// Hard-edged filled circle at a sub-pixel center. Pixels whose center
/// falls within the radius are set; everything off-canvas is clipped.
fn stamp_circle(raster: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let w = raster.width() as i64;
    let h = raster.height() as i64;
    let min_x = ((cx - radius).floor() as i64).max(0);
    let max_x = ((cx + radius).ceil() as i64).min(w - 1);
    let min_y = ((cy - radius).floor() as i64).max(0);
    let max_y = ((cy + radius).ceil() as i64).min(h - 1);
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 + 0.5 - cx;
            let py = y as f32 + 0.5 - cy;
            if px * px + py * py <= r2 {
                raster.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_count(raster: &RgbaImage) -> usize {
        raster.pixels().filter(|p| p.0[3] != 0).count()
    }

    #[test]
    fn begin_extend_end_records_a_path() {
        let mut layer = StrokeLayer::new(100, 100);
        layer.begin_stroke(FillColor::BLACK, 4.0);
        layer.extend_stroke(StrokePoint::new(10.0, 10.0));
        layer.extend_stroke(StrokePoint::new(40.0, 10.0));
        layer.end_stroke();
        assert_eq!(layer.paths().len(), 1);
        assert_eq!(layer.paths()[0].points.len(), 2);
    }

    #[test]
    fn empty_gesture_is_discarded() {
        let mut layer = StrokeLayer::new(100, 100);
        layer.begin_stroke(FillColor::BLACK, 4.0);
        layer.end_stroke();
        assert!(layer.is_empty());
    }

    #[test]
    fn extend_without_begin_is_ignored() {
        let mut layer = StrokeLayer::new(100, 100);
        layer.extend_stroke(StrokePoint::new(5.0, 5.0));
        layer.end_stroke();
        assert!(layer.is_empty());
    }

    #[test]
    fn begin_twice_finishes_the_first_gesture() {
        let mut layer = StrokeLayer::new(100, 100);
        layer.begin_stroke(FillColor::BLACK, 4.0);
        layer.extend_stroke(StrokePoint::new(1.0, 1.0));
        layer.begin_stroke(FillColor::WHITE, 2.0);
        layer.extend_stroke(StrokePoint::new(2.0, 2.0));
        layer.end_stroke();
        assert_eq!(layer.paths().len(), 2);
    }

    #[test]
    fn clear_after_two_strokes_leaves_zero_paths_and_transparent_render() {
        let mut layer = StrokeLayer::new(64, 64);
        for y in [10.0f32, 30.0] {
            layer.begin_stroke(FillColor::new(200, 40, 40), 3.0);
            layer.extend_stroke(StrokePoint::new(5.0, y));
            layer.extend_stroke(StrokePoint::new(50.0, y));
            layer.end_stroke();
        }
        assert_eq!(layer.paths().len(), 2);
        layer.clear();
        assert_eq!(layer.paths().len(), 0);
        let raster = layer.render(64, 64);
        assert_eq!(opaque_count(&raster), 0);
    }

    #[test]
    fn render_marks_pixels_along_the_path() {
        let mut layer = StrokeLayer::new(64, 64);
        layer.begin_stroke(FillColor::BLACK, 2.0);
        layer.extend_stroke(StrokePoint::new(8.0, 32.0));
        layer.extend_stroke(StrokePoint::new(56.0, 32.0));
        layer.end_stroke();
        let raster = layer.render(64, 64);
        assert_eq!(*raster.get_pixel(32, 32), Rgba([0, 0, 0, 255]));
        assert!(opaque_count(&raster) > 40);
        // Far from the line nothing is painted.
        assert_eq!(raster.get_pixel(32, 5).0[3], 0);
    }

    #[test]
    fn render_scales_to_target_size() {
        // A stroke across the middle of a 100×100 layer rendered at 50×50
        // lands across the middle of the smaller raster.
        let mut layer = StrokeLayer::new(100, 100);
        layer.begin_stroke(FillColor::BLACK, 4.0);
        layer.extend_stroke(StrokePoint::new(10.0, 50.0));
        layer.extend_stroke(StrokePoint::new(90.0, 50.0));
        layer.end_stroke();
        let raster = layer.render(50, 50);
        assert_eq!(raster.dimensions(), (50, 50));
        assert_eq!(raster.get_pixel(25, 25).0[3], 255);
        assert_eq!(raster.get_pixel(25, 40).0[3], 0);
    }

    #[test]
    fn single_point_path_stamps_one_dot() {
        let mut layer = StrokeLayer::new(32, 32);
        layer.begin_stroke(FillColor::BLACK, 6.0);
        layer.extend_stroke(StrokePoint::new(16.0, 16.0));
        layer.end_stroke();
        let raster = layer.render(32, 32);
        let n = opaque_count(&raster);
        assert!(n > 0, "dot must mark pixels");
        // Radius 3 circle: comfortably under a 7×7 bounding box.
        assert!(n <= 49, "dot painted {n} pixels");
    }

    #[test]
    fn off_canvas_points_are_clipped() {
        let mut layer = StrokeLayer::new(32, 32);
        layer.begin_stroke(FillColor::BLACK, 4.0);
        layer.extend_stroke(StrokePoint::new(-20.0, -20.0));
        layer.extend_stroke(StrokePoint::new(60.0, 60.0));
        layer.end_stroke();
        // Must not panic; the on-canvas diagonal is painted.
        let raster = layer.render(32, 32);
        assert!(opaque_count(&raster) > 0);
    }
}

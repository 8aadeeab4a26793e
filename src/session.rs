//! One active coloring session.
//!
//! A [`ColoringSession`] exclusively owns the working raster and the stroke
//! layer for a single page. All mutators run synchronously on the caller's
//! thread; the only asynchrony in the system is image decode/encode, which
//! lives on the host side — the engine accepts nothing but fully decoded
//! `RgbaImage`s, so it can never read half-decoded pixel data.
//!
//! Error posture: mutators never fail. Out-of-bounds pointer coordinates
//! and calls before the background is loaded degrade to silent no-ops (a
//! coloring tool must not crash on pointer jitter); only the export surface
//! returns `Result`, because it has to hand something back.

use image::RgbaImage;
use uuid::Uuid;

use crate::canvas::PixelBuffer;
use crate::color::{DEFAULT_FILL_BUDGET, DEFAULT_TOLERANCE, FillColor};
use crate::compositor;
use crate::fill::{FillOutcome, flood_fill};
use crate::io;
use crate::stroke::{StrokeLayer, StrokePath, StrokePoint};
use crate::{log_info, log_warn};

/// Errors surfaced by the export path. Everything else in the session
/// degrades to a no-op instead.
#[derive(Debug)]
pub enum SessionError {
    /// Export requested before a background image was loaded. Returned
    /// instead of a blank bitmap so hosts cannot silently persist an empty
    /// page.
    NotReady,
    /// The composed bitmap could not be encoded.
    Encode(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotReady => write!(f, "background image not loaded yet"),
            SessionError::Encode(e) => write!(f, "encode error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

/// A single open coloring activity: background art, fill raster, strokes.
#[derive(Debug)]
pub struct ColoringSession {
    id: Uuid,
    activity: String,
    /// Pristine decoded page art; the reset target for `clear()`.
    background: Option<RgbaImage>,
    /// Working raster with fills baked in. Present iff `background` is.
    buffer: Option<PixelBuffer>,
    strokes: Option<StrokeLayer>,
    tolerance: u8,
    fill_budget: usize,
}

impl ColoringSession {
    /// Open a session for an activity. The session is not ready until
    /// [`load_background`](Self::load_background) supplies the decoded art.
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity: activity.into(),
            background: None,
            buffer: None,
            strokes: None,
            tolerance: DEFAULT_TOLERANCE,
            fill_budget: DEFAULT_FILL_BUDGET,
        }
    }

    /// Install the decoded background art. Builds the working buffer from
    /// it and sizes the stroke layer; the session is ready afterwards.
    /// Loading again replaces the page and discards all edits.
    pub fn load_background(&mut self, image: RgbaImage) {
        log_info!(
            "session {}: background loaded for '{}' ({}x{})",
            self.id,
            self.activity,
            image.width(),
            image.height()
        );
        self.buffer = Some(PixelBuffer::from_image(&image));
        self.strokes = Some(StrokeLayer::new(image.width(), image.height()));
        self.background = Some(image);
    }

    /// True once a background has been loaded.
    pub fn is_ready(&self) -> bool {
        self.background.is_some()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// Native working size, once ready.
    pub fn native_size(&self) -> Option<(u32, u32)> {
        self.background.as_ref().map(|b| b.dimensions())
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    /// Tune the fill tolerance. Takes effect from the next fill; a running
    /// fill never sees a tolerance change.
    pub fn set_tolerance(&mut self, tolerance: u8) {
        self.tolerance = tolerance;
    }

    pub fn fill_budget(&self) -> usize {
        self.fill_budget
    }

    pub fn set_fill_budget(&mut self, max_pixels: usize) {
        self.fill_budget = max_pixels;
    }

    /// Borrow the working raster (tests, hosts rendering previews).
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// Finished stroke paths, in draw order.
    pub fn stroke_paths(&self) -> &[StrokePath] {
        self.strokes.as_ref().map(|s| s.paths()).unwrap_or(&[])
    }

    /// Flood-fill from a click at buffer coordinates `(x, y)`. Before
    /// readiness or out of bounds this paints nothing. Budget exhaustion
    /// leaves a truncated region and is reported in the outcome, not as an
    /// error.
    pub fn fill(&mut self, x: u32, y: u32, color: FillColor) -> FillOutcome {
        let Some(ref mut buffer) = self.buffer else {
            log_warn!("session {}: fill before background load ignored", self.id);
            return FillOutcome::default();
        };
        let outcome = flood_fill(buffer, x, y, color, self.tolerance, self.fill_budget);
        if outcome.budget_exhausted {
            log_warn!(
                "session {}: fill at ({}, {}) hit the {} pixel budget",
                self.id,
                x,
                y,
                self.fill_budget
            );
        }
        outcome
    }

    /// Start a freehand stroke. No-op before readiness.
    pub fn begin_stroke(&mut self, color: FillColor, width: f32) {
        if let Some(ref mut strokes) = self.strokes {
            strokes.begin_stroke(color, width);
        }
    }

    /// Start an "eraser" stroke. Erasing is approximated by stroking with
    /// paintable white — correct over the solid page background, visibly
    /// wrong over textured art. True erasing would need alpha punch-through
    /// in the compositor.
    pub fn begin_eraser(&mut self, width: f32) {
        self.begin_stroke(FillColor::WHITE, width);
    }

    /// Append a pointer-drag sample to the active stroke.
    pub fn extend_stroke(&mut self, point: StrokePoint) {
        if let Some(ref mut strokes) = self.strokes {
            strokes.extend_stroke(point);
        }
    }

    /// Finish the active stroke.
    pub fn end_stroke(&mut self) {
        if let Some(ref mut strokes) = self.strokes {
            strokes.end_stroke();
        }
    }

    /// Reset to the loaded background: the working buffer is replaced
    /// wholesale from the pristine art and every stroke is dropped.
    pub fn clear(&mut self) {
        let Some(ref background) = self.background else {
            return;
        };
        self.buffer = Some(PixelBuffer::from_image(background));
        if let Some(ref mut strokes) = self.strokes {
            strokes.clear();
        }
        log_info!("session {}: cleared to background", self.id);
    }

    /// Compose background + fills + strokes at the requested export size.
    pub fn export_composite(
        &self,
        target_w: u32,
        target_h: u32,
    ) -> Result<RgbaImage, SessionError> {
        let (Some(background), Some(buffer), Some(strokes)) =
            (&self.background, &self.buffer, &self.strokes)
        else {
            return Err(SessionError::NotReady);
        };
        Ok(compositor::compose(background, buffer, strokes, target_w, target_h))
    }

    /// Compose and encode to PNG bytes for the host to persist or download.
    pub fn export_png(&self, target_w: u32, target_h: u32) -> Result<Vec<u8>, SessionError> {
        let composite = self.export_composite(target_w, target_h)?;
        io::encode_png(&composite).map_err(SessionError::Encode)
    }

    /// Rebuild a session from snapshot parts. Crate-internal; hosts go
    /// through `project::load_snapshot`.
    pub(crate) fn from_parts(
        activity: String,
        background: RgbaImage,
        buffer: PixelBuffer,
        paths: Vec<StrokePath>,
        tolerance: u8,
    ) -> Self {
        let (w, h) = background.dimensions();
        Self {
            id: Uuid::new_v4(),
            activity,
            buffer: Some(buffer),
            strokes: Some(StrokeLayer::restore(w, h, paths)),
            background: Some(background),
            tolerance,
            fill_budget: DEFAULT_FILL_BUDGET,
        }
    }

    pub(crate) fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }
}

//! TintBook — a raster coloring engine for line-art book pages.
//!
//! The host UI supplies a decoded page image, pointer coordinates already
//! mapped into buffer space, and a selected color; the engine does the
//! pixel work: tolerance-based scanline flood fill, a vector freehand
//! stroke layer, and an export compositor that merges background + fills +
//! strokes into one bitmap at a caller-chosen size.

pub mod canvas;
pub mod cli;
pub mod color;
pub mod compositor;
pub mod fill;
pub mod io;
pub mod logger;
pub mod project;
pub mod session;
pub mod stroke;

pub use canvas::PixelBuffer;
pub use color::{DEFAULT_FILL_BUDGET, DEFAULT_TOLERANCE, FillColor};
pub use fill::{FillOutcome, flood_fill};
pub use session::{ColoringSession, SessionError};
pub use stroke::{StrokeLayer, StrokePath, StrokePoint};

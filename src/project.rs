//! Session snapshots — save a partially colored page and resume later.
//!
//! File format (`.tbk`): 4-byte magic `TBK1`, then a bincode-encoded
//! [`SnapshotV1`]. Both the pristine background and the working raster are
//! stored so `clear()` still works after a resume; strokes stay vector.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::canvas::PixelBuffer;
use crate::session::ColoringSession;
use crate::stroke::StrokePath;

const MAGIC: &[u8; 4] = b"TBK1";

/// Error type for snapshot file operations.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
    /// The session has no background yet — there is nothing to save.
    NotReady,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O error: {}", e),
            SnapshotError::Serialize(e) => write!(f, "serialization error: {}", e),
            SnapshotError::InvalidFormat(e) => write!(f, "invalid snapshot: {}", e),
            SnapshotError::NotReady => write!(f, "session has no background loaded"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SnapshotError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SnapshotError::Serialize(e.to_string())
    }
}

/// Version 1 snapshot payload.
#[derive(Serialize, Deserialize)]
struct SnapshotV1 {
    activity: String,
    width: u32,
    height: u32,
    /// Pristine background, raw RGBA.
    background: Vec<u8>,
    /// Working raster with fills baked in, raw RGBA.
    buffer: Vec<u8>,
    strokes: Vec<StrokePath>,
    tolerance: u8,
}

/// Save a session to a `.tbk` snapshot file.
pub fn save_snapshot(session: &ColoringSession, path: &Path) -> Result<(), SnapshotError> {
    let (background, buffer) = match (session.background(), session.buffer()) {
        (Some(bg), Some(buf)) => (bg, buf),
        _ => return Err(SnapshotError::NotReady),
    };
    let snapshot = SnapshotV1 {
        activity: session.activity().to_string(),
        width: background.width(),
        height: background.height(),
        background: background.as_raw().clone(),
        buffer: buffer.raw().to_vec(),
        strokes: session.stroke_paths().to_vec(),
        tolerance: session.tolerance(),
    };

    let payload = bincode::serialize(&snapshot)?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&payload);
    std::fs::write(path, bytes)?;
    crate::log_info!(
        "snapshot saved: '{}' ({}x{}, {} strokes) -> {}",
        snapshot.activity,
        snapshot.width,
        snapshot.height,
        snapshot.strokes.len(),
        path.display()
    );
    Ok(())
}

/// Load a `.tbk` snapshot back into a ready session (with a fresh id).
pub fn load_snapshot(path: &Path) -> Result<ColoringSession, SnapshotError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::InvalidFormat(
            "missing TBK1 magic header".to_string(),
        ));
    }
    let snapshot: SnapshotV1 = bincode::deserialize(&bytes[MAGIC.len()..])?;

    let expected = snapshot.width as usize * snapshot.height as usize * 4;
    if snapshot.background.len() != expected || snapshot.buffer.len() != expected {
        return Err(SnapshotError::InvalidFormat(format!(
            "raster length mismatch for {}x{}",
            snapshot.width, snapshot.height
        )));
    }

    let background =
        RgbaImage::from_raw(snapshot.width, snapshot.height, snapshot.background)
            .ok_or_else(|| SnapshotError::InvalidFormat("bad background raster".to_string()))?;
    let buffer_image = RgbaImage::from_raw(snapshot.width, snapshot.height, snapshot.buffer)
        .ok_or_else(|| SnapshotError::InvalidFormat("bad working raster".to_string()))?;

    Ok(ColoringSession::from_parts(
        snapshot.activity,
        background,
        PixelBuffer::from_image(&buffer_image),
        snapshot.strokes,
        snapshot.tolerance,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::FillColor;
    use crate::stroke::StrokePoint;
    use image::Rgba;

    fn colored_session() -> ColoringSession {
        let mut session = ColoringSession::new("page-3");
        let mut page = RgbaImage::from_pixel(12, 8, Rgba([255, 255, 255, 255]));
        for y in 0..8 {
            page.put_pixel(6, y, Rgba([0, 0, 0, 255]));
        }
        session.load_background(page);
        session.fill(1, 1, FillColor::new(255, 0, 0));
        session.begin_stroke(FillColor::BLACK, 2.0);
        session.extend_stroke(StrokePoint::new(2.0, 2.0));
        session.extend_stroke(StrokePoint::new(9.0, 6.0));
        session.end_stroke();
        session
    }

    #[test]
    fn snapshot_round_trip() {
        let session = colored_session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-3.tbk");
        save_snapshot(&session, &path).unwrap();

        let restored = load_snapshot(&path).unwrap();
        assert_eq!(restored.activity(), "page-3");
        assert_eq!(restored.native_size(), Some((12, 8)));
        assert_eq!(restored.buffer(), session.buffer());
        assert_eq!(restored.stroke_paths().len(), 1);
        assert_eq!(restored.tolerance(), session.tolerance());
        // Exports agree pixel for pixel.
        assert_eq!(
            restored.export_composite(12, 8).unwrap(),
            session.export_composite(12, 8).unwrap()
        );
        // And the restored session can still reset to the pristine page.
        let mut restored = restored;
        restored.clear();
        assert_eq!(
            restored.export_composite(12, 8).unwrap(),
            *session.background().unwrap()
        );
    }

    #[test]
    fn save_requires_a_loaded_background() {
        let session = ColoringSession::new("empty");
        let dir = tempfile::tempdir().unwrap();
        let err = save_snapshot(&session, &dir.path().join("x.tbk")).unwrap_err();
        assert!(matches!(err, SnapshotError::NotReady));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.tbk");
        std::fs::write(&path, b"PNG!not a snapshot").unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let session = colored_session();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.tbk");
        save_snapshot(&session, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(load_snapshot(&path).is_err());
    }
}

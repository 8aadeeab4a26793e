// ============================================================================
// TintBook CLI — headless fill-and-export via command-line arguments
// ============================================================================
//
// Usage examples:
//   tintbook -i page.png --fill 120,340:#ff0000 -o colored.png
//   tintbook -i page.webp --fill 50,60:#00aaff --fill 300,200:#ffcc00 \
//            --tolerance 52 --size 800x600 -o out.png
//   tintbook -i page.png --fill 10,10:#ff0000 --snapshot progress.tbk
//   tintbook --resume progress.tbk --fill 420,90:#22cc22 -o out.png
//
// No GUI is involved. Fills are applied in argument order against the
// decoded page, then the composite is exported and/or snapshotted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::color::{DEFAULT_FILL_BUDGET, DEFAULT_TOLERANCE, FillColor};
use crate::io::{decode_image, write_png};
use crate::project::{load_snapshot, save_snapshot};
use crate::session::ColoringSession;

/// TintBook headless coloring engine.
///
/// Flood-fill regions of a line-art page and export the composite — no GUI
/// required.
#[derive(Parser, Debug)]
#[command(
    name = "tintbook",
    about = "Headless line-art coloring: flood fills + PNG export",
    long_about = "Apply click-style flood fills to a line-art page image and export\n\
                  the composed result as PNG, without opening a GUI. Pages may be\n\
                  PNG, WebP or JPEG. Progress can be saved to / resumed from .tbk\n\
                  snapshot files.\n\n\
                  Example:\n  \
                  tintbook -i page.png --fill 120,340:#ff0000 -o colored.png"
)]
pub struct CliArgs {
    /// Input page image (PNG/WebP/JPEG). Mutually exclusive with --resume.
    #[arg(short, long, value_name = "IMAGE", conflicts_with = "resume")]
    pub input: Option<PathBuf>,

    /// Resume from a .tbk snapshot instead of a fresh page.
    #[arg(long, value_name = "FILE.tbk")]
    pub resume: Option<PathBuf>,

    /// Fill operation "X,Y:#RRGGBB", applied in order. Repeatable.
    #[arg(long, value_name = "X,Y:#RRGGBB")]
    pub fill: Vec<String>,

    /// Per-channel fill tolerance (0-255).
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE, value_name = "0-255")]
    pub tolerance: u8,

    /// Pixel budget per fill — safety valve against runaway fills.
    #[arg(long, default_value_t = DEFAULT_FILL_BUDGET, value_name = "PIXELS")]
    pub budget: usize,

    /// Export size "WxH". Defaults to the page's native size.
    #[arg(long, value_name = "WxH")]
    pub size: Option<String>,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE.png")]
    pub output: Option<PathBuf>,

    /// Save session progress to a .tbk snapshot after applying fills.
    #[arg(long, value_name = "FILE.tbk")]
    pub snapshot: Option<PathBuf>,

    /// Print per-operation timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One parsed `--fill` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSpec {
    pub x: u32,
    pub y: u32,
    pub color: FillColor,
}

/// Parse "X,Y:#RRGGBB".
pub fn parse_fill_spec(spec: &str) -> Result<FillSpec, String> {
    let (coords, color) = spec
        .split_once(':')
        .ok_or_else(|| format!("'{}': expected X,Y:#RRGGBB", spec))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("'{}': coordinates must be X,Y", spec))?;
    let x: u32 = x.trim().parse().map_err(|_| format!("'{}': bad x coordinate", spec))?;
    let y: u32 = y.trim().parse().map_err(|_| format!("'{}': bad y coordinate", spec))?;
    let color = FillColor::from_hex(color.trim())
        .ok_or_else(|| format!("'{}': bad hex color '{}'", spec, color))?;
    Ok(FillSpec { x, y, color })
}

/// Parse "WxH".
pub fn parse_size(size: &str) -> Result<(u32, u32), String> {
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("'{}': expected WxH", size))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("'{}': bad width", size))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("'{}': bad height", size))?;
    if w == 0 || h == 0 {
        return Err(format!("'{}': dimensions must be nonzero", size));
    }
    Ok((w, h))
}

/// Run all CLI processing and return an OS exit code.
/// `0` = success, `1` = any failure.
pub fn run(args: CliArgs) -> ExitCode {
    // Open the session: fresh page or resumed snapshot.
    let mut session = match (&args.input, &args.resume) {
        (Some(path), None) => {
            let started = Instant::now();
            let page = match decode_image(path) {
                Ok(page) => page,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if args.verbose {
                println!(
                    "decoded {} ({}x{}) in {:.1?}",
                    path.display(),
                    page.width(),
                    page.height(),
                    started.elapsed()
                );
            }
            let activity = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "page".to_string());
            let mut session = ColoringSession::new(activity);
            session.load_background(page);
            session
        }
        (None, Some(path)) => match load_snapshot(path) {
            Ok(session) => {
                if args.verbose {
                    println!("resumed '{}' from {}", session.activity(), path.display());
                }
                session
            }
            Err(e) => {
                eprintln!("error: could not resume '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        _ => {
            eprintln!("error: exactly one of --input or --resume is required.");
            return ExitCode::FAILURE;
        }
    };

    if args.output.is_none() && args.snapshot.is_none() {
        eprintln!("error: nothing to do — pass --output and/or --snapshot.");
        return ExitCode::FAILURE;
    }

    session.set_tolerance(args.tolerance);
    session.set_fill_budget(args.budget);

    // Apply fills in argument order.
    for raw in &args.fill {
        let spec = match parse_fill_spec(raw) {
            Ok(spec) => spec,
            Err(e) => {
                eprintln!("error: bad --fill {}", e);
                return ExitCode::FAILURE;
            }
        };
        let started = Instant::now();
        let outcome = session.fill(spec.x, spec.y, spec.color);
        if outcome.painted == 0 {
            eprintln!(
                "warning: fill at ({}, {}) painted nothing (outside the page, or tolerance 0)",
                spec.x, spec.y
            );
        } else if outcome.budget_exhausted {
            eprintln!(
                "warning: fill at ({}, {}) stopped at the {} pixel budget",
                spec.x, spec.y, args.budget
            );
        }
        if args.verbose {
            println!(
                "fill ({}, {}) {} -> {} px in {:.1?}",
                spec.x,
                spec.y,
                spec.color,
                outcome.painted,
                started.elapsed()
            );
        }
    }

    // Export.
    if let Some(out_path) = &args.output {
        let (w, h) = match &args.size {
            Some(size) => match parse_size(size) {
                Ok(dims) => dims,
                Err(e) => {
                    eprintln!("error: bad --size {}", e);
                    return ExitCode::FAILURE;
                }
            },
            // Session is ready here, native size always present.
            None => session.native_size().unwrap_or((1, 1)),
        };
        let started = Instant::now();
        let composite = match session.export_composite(w, h) {
            Ok(composite) => composite,
            Err(e) => {
                eprintln!("error: export failed: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = write_png(&composite, out_path) {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            println!(
                "exported {}x{} -> {} in {:.1?}",
                w,
                h,
                out_path.display(),
                started.elapsed()
            );
        }
    }

    // Snapshot.
    if let Some(snap_path) = &args.snapshot {
        if let Err(e) = save_snapshot(&session, snap_path) {
            eprintln!("error: could not save snapshot '{}': {}", snap_path.display(), e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            println!("snapshot saved -> {}", snap_path.display());
        }
    }

    ExitCode::SUCCESS
}

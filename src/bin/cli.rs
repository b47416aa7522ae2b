//! CLI for rendering the selfie guide overlay.
//!
//! Usage:
//!   selfie-guide --frame frame.json -o overlay.png          # Detections from JSON
//!   selfie-guide --image me.jpg --detector seeta.bin -o out.png
//!   selfie-guide --frame frame.json --json                   # Per-face summary
//!   selfie-guide --frame frame.json --ops ops.json           # Dump draw calls

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use image::{imageops, DynamicImage, RgbaImage};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use selfie_guide::{
    guide_rect, FaceDetector, FaceEffects, FacingMode, Frame, FrameFeed, GraphicOverlay,
    ImageSize, Orientation, OverlayStyle, RasterCanvas, RecordingCanvas, RectF,
    RustfaceDetector, RustfaceSettings,
};

#[derive(Parser, Debug)]
#[command(name = "selfie-guide")]
#[command(author, version, about = "Render the selfie framing-guide overlay", long_about = None)]
struct Args {
    /// Frame file (JSON): source size plus face detections
    #[arg(long, conflicts_with = "detector")]
    frame: Option<PathBuf>,

    /// Photo to detect faces in and composite the overlay over
    #[arg(long)]
    image: Option<PathBuf>,

    /// SeetaFace model used to detect faces in --image
    #[arg(long)]
    detector: Option<PathBuf>,

    /// Minimum face size for detection
    #[arg(long, default_value = "20")]
    min_face_size: u32,

    /// Surface width (default: source width)
    #[arg(long)]
    width: Option<u32>,

    /// Surface height (default: source height)
    #[arg(long)]
    height: Option<u32>,

    /// Camera facing mode
    #[arg(long, value_enum, default_value_t = Facing::Front)]
    facing: Facing,

    /// Device orientation; use landscape for upright still photos
    #[arg(long, value_enum, default_value_t = Layout::Portrait)]
    orientation: Layout,

    /// Overlay style file (JSON)
    #[arg(long)]
    style: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the recorded draw calls as JSON to this path
    #[arg(long)]
    ops: Option<PathBuf>,

    /// Print a per-face summary as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Facing {
    Front,
    Back,
}

impl From<Facing> for FacingMode {
    fn from(f: Facing) -> Self {
        match f {
            Facing::Front => FacingMode::Front,
            Facing::Back => FacingMode::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    Portrait,
    Landscape,
}

impl From<Layout> for Orientation {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Portrait => Orientation::Portrait,
            Layout::Landscape => Orientation::Landscape,
        }
    }
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Summary {
    surface: ImageSize,
    source: ImageSize,
    facing: FacingMode,
    orientation: Orientation,
    guide: RectF,
    faces: Vec<FaceSummary>,
}

#[derive(Serialize)]
struct FaceSummary {
    /// Face index (1-based)
    index: usize,
    /// Bounding box mapped into view space
    mapped_box: RectF,
    inside_guide: bool,
    smile: bool,
    blink: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let style = match &args.style {
        Some(path) => OverlayStyle::load(path)
            .with_context(|| format!("failed to load style {}", path.display()))?,
        None => OverlayStyle::default(),
    };

    let photo = match &args.image {
        Some(path) => Some(
            image::open(path).with_context(|| format!("failed to open image {}", path.display()))?,
        ),
        None => None,
    };

    let frame = load_frame(&args, photo.as_ref())?;
    tracing::info!(
        faces = frame.faces.len(),
        width = frame.source.width,
        height = frame.source.height,
        "frame loaded"
    );

    let surface = ImageSize::new(
        args.width.unwrap_or(frame.source.width),
        args.height.unwrap_or(frame.source.height),
    );
    let overlay = Arc::new(GraphicOverlay::with_style(surface.width, surface.height, style)?);
    overlay.set_facing_mode(args.facing.into());
    overlay.set_orientation(args.orientation.into());

    if args.json {
        let summary = summarize(&overlay, &frame);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    let mut feed = FrameFeed::new(overlay.clone());
    feed.present(frame);

    if let Some(path) = &args.ops {
        let mut recorder = RecordingCanvas::new(surface.width, surface.height);
        overlay.render(&mut recorder);
        let ops = recorder.into_ops();
        std::fs::write(path, serde_json::to_string_pretty(&ops)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), ops = ops.len(), "draw calls written");
    }

    if let Some(path) = &args.output {
        let mut canvas = RasterCanvas::new(surface.width, surface.height);
        overlay.render(&mut canvas);
        let layer = canvas.into_image();

        let composed = match &photo {
            Some(photo) => composite(photo, &layer, overlay.facing_mode()),
            None => layer,
        };
        composed
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "overlay written");
    }

    Ok(())
}

fn load_frame(args: &Args, photo: Option<&DynamicImage>) -> Result<Frame> {
    if let Some(path) = &args.frame {
        return Frame::load(path).with_context(|| format!("failed to load frame {}", path.display()));
    }

    let (Some(photo), Some(model)) = (photo, &args.detector) else {
        bail!("either --frame, or --image together with --detector, is required");
    };

    let settings = RustfaceSettings {
        min_face_size: args.min_face_size,
        ..RustfaceSettings::default()
    };
    let detector = RustfaceDetector::load(model, settings)
        .with_context(|| format!("failed to load face detector {}", model.display()))?;
    Ok(detector.detect_frame(photo))
}

fn summarize(overlay: &GraphicOverlay, frame: &Frame) -> Summary {
    let transform = overlay.transform().for_source(frame.source);
    let guide = guide_rect(overlay.surface(), overlay.style());

    let faces = frame
        .faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let mapped_box = transform.map_box(&face.bounding_box).normalized();
            let effects = FaceEffects::evaluate(face, overlay.style());
            FaceSummary {
                index: i + 1,
                mapped_box,
                inside_guide: guide.contains(&mapped_box),
                smile: effects.smile,
                blink: effects.blink,
            }
        })
        .collect();

    Summary {
        surface: overlay.surface(),
        source: frame.source,
        facing: overlay.facing_mode(),
        orientation: overlay.orientation(),
        guide,
        faces,
    }
}

/// Fill-crop the photo to the surface, mirror it for the front camera, and
/// lay the overlay on top.
fn composite(photo: &DynamicImage, layer: &RgbaImage, facing: FacingMode) -> RgbaImage {
    let (width, height) = layer.dimensions();
    let mut base = photo
        .resize_to_fill(width, height, imageops::FilterType::Triangle)
        .to_rgba8();
    if facing.is_front() {
        imageops::flip_horizontal_in_place(&mut base);
    }
    imageops::overlay(&mut base, layer, 0, 0);
    base
}

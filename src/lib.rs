//! # selfie-guide
//!
//! Face-framing overlay composition for selfie camera previews.
//!
//! This crate provides:
//! - **Overlay surface**: a thread-safe list of graphics drawn over a translucent
//!   scrim with a rounded-rectangle framing guide cut out of it
//! - **Coordinate mapping**: fill-crop scaling of detector geometry from camera
//!   image space into view space, mirrored for the front camera
//! - **Face graphics**: a guide border that turns solid once the face sits inside
//!   the guide, plus lip highlights on a smile and eye highlights on a blink
//!
//! Face detection itself is external: detections are plain data
//! ([`FaceDetection`]) that any detector can produce. A SeetaFace-backed
//! [`RustfaceDetector`] is included for still images.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use selfie_guide::{
//!     BoundingBox, FaceDetection, Frame, FrameFeed, GraphicOverlay, ImageSize, RecordingCanvas,
//! };
//!
//! let overlay = Arc::new(GraphicOverlay::new(1080, 1920).unwrap());
//! let mut feed = FrameFeed::new(overlay.clone());
//!
//! // One camera frame with one detected face.
//! let face = FaceDetection::new(BoundingBox::new(400, 800, 680, 1200)).with_smiling_probability(0.95);
//! feed.present(Frame::new(ImageSize::new(1080, 1920), vec![face]));
//!
//! if overlay.take_redraw_request() {
//!     let mut canvas = RecordingCanvas::new(1080, 1920);
//!     overlay.render(&mut canvas);
//!     println!("{} draw calls", canvas.ops().len());
//! }
//! ```
//!
//! ## Custom Graphics
//!
//! Anything implementing [`Graphic`] can be hosted by the overlay:
//!
//! ```rust
//! use selfie_guide::{Canvas, Color, DrawContext, Graphic, Point, Stroke};
//!
//! struct Crosshair;
//!
//! impl Graphic for Crosshair {
//!     fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
//!         let size = ctx.transform.surface();
//!         let (cx, cy) = (size.width as f32 / 2.0, size.height as f32 / 2.0);
//!         let stroke = Stroke::solid(Color::WHITE, 2.0);
//!         canvas.stroke_path(&[Point::new(cx - 10.0, cy), Point::new(cx + 10.0, cy)], &stroke);
//!         canvas.stroke_path(&[Point::new(cx, cy - 10.0), Point::new(cx, cy + 10.0)], &stroke);
//!     }
//! }
//! ```

mod canvas;
mod color;
mod detector;
mod error;
mod face;
mod feed;
mod graphic;
mod overlay;
mod style;
mod transform;
mod types;

pub use canvas::{Canvas, DashPattern, DrawOp, RasterCanvas, RecordingCanvas, Stroke};
pub use color::Color;
pub use detector::{FaceDetector, RustfaceDetector, RustfaceSettings};
pub use error::{Error, Result};
pub use face::{Contour, ContourKind, FaceDetection, Frame, HeadAngles};
pub use feed::FrameFeed;
pub use graphic::{
    guide_rect, guide_stroke, DrawContext, FaceEffects, FaceGraphic, Graphic, BLINK_CONTOURS,
    SMILE_CONTOURS,
};
pub use overlay::{GraphicId, GraphicOverlay};
pub use style::OverlayStyle;
pub use transform::{FacingMode, Orientation, OverlayTransform, ScaleOffset};
pub use types::{BoundingBox, ImageSize, Point, RectF};

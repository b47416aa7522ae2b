//! The overlay surface: a locked list of graphics drawn over a masked scrim.
//!
//! All list mutation and the render-time iteration share one mutex. A frame
//! swapped in through [`GraphicOverlay::replace`] is therefore seen whole or not
//! at all by a render pass. Redraw requests are a flag the
//! display loop polls with [`GraphicOverlay::take_redraw_request`]; nothing here
//! blocks waiting for a redraw.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use image::RgbaImage;

use crate::canvas::{Canvas, RasterCanvas};
use crate::error::{Error, Result};
use crate::graphic::{guide_rect, DrawContext, Graphic};
use crate::style::OverlayStyle;
use crate::transform::{FacingMode, Orientation, OverlayTransform};
use crate::types::ImageSize;

/// Handle returned by [`GraphicOverlay::add`], used to remove that graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphicId(u64);

struct OverlayState {
    surface: ImageSize,
    source: Option<ImageSize>,
    graphics: Vec<(GraphicId, Arc<dyn Graphic>)>,
    /// Off-screen copy of the graphics layer, kept for pixel sampling.
    process: Option<RasterCanvas>,
}

pub struct GraphicOverlay {
    state: Mutex<OverlayState>,
    style: OverlayStyle,
    front_facing: AtomicBool,
    landscape: AtomicBool,
    redraw_requested: AtomicBool,
    next_id: AtomicU64,
}

impl GraphicOverlay {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_style(width, height, OverlayStyle::default())
    }

    pub fn with_style(width: u32, height: u32, style: OverlayStyle) -> Result<Self> {
        let surface = ImageSize::new(width, height);
        if surface.is_empty() {
            return Err(Error::InvalidSurface { width, height });
        }

        Ok(Self {
            state: Mutex::new(OverlayState {
                surface,
                source: None,
                graphics: Vec::new(),
                process: None,
            }),
            style,
            front_facing: AtomicBool::new(FacingMode::default().is_front()),
            landscape: AtomicBool::new(Orientation::default() == Orientation::Landscape),
            redraw_requested: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("overlay lock poisoned; continuing with last state");
            poisoned.into_inner()
        })
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn surface(&self) -> ImageSize {
        self.lock().surface
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        let surface = ImageSize::new(width, height);
        if surface.is_empty() {
            return Err(Error::InvalidSurface { width, height });
        }
        self.lock().surface = surface;
        self.request_redraw();
        Ok(())
    }

    pub fn facing_mode(&self) -> FacingMode {
        if self.front_facing.load(Ordering::Acquire) {
            FacingMode::Front
        } else {
            FacingMode::Back
        }
    }

    pub fn set_facing_mode(&self, mode: FacingMode) {
        self.front_facing.store(mode.is_front(), Ordering::Release);
    }

    /// Switch between the front and back camera.
    pub fn toggle_facing_mode(&self) -> FacingMode {
        let was_front = self.front_facing.fetch_xor(true, Ordering::AcqRel);
        let mode = if was_front {
            FacingMode::Back
        } else {
            FacingMode::Front
        };
        tracing::debug!(?mode, "facing mode toggled");
        mode
    }

    pub fn orientation(&self) -> Orientation {
        if self.landscape.load(Ordering::Acquire) {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.landscape
            .store(orientation == Orientation::Landscape, Ordering::Release);
    }

    /// Record the pixel size of the camera image the current graphics refer to.
    pub fn set_source_size(&self, source: ImageSize) {
        self.lock().source = Some(source);
    }

    pub fn source_size(&self) -> Option<ImageSize> {
        self.lock().source
    }

    pub fn clear(&self) {
        self.lock().graphics.clear();
        self.request_redraw();
    }

    /// Append a graphic. Draw order is insertion order.
    ///
    /// Does not request a redraw; callers add a whole frame's graphics and then
    /// ask for one.
    pub fn add<G: Graphic + 'static>(&self, graphic: G) -> GraphicId {
        self.add_shared(Arc::new(graphic))
    }

    pub fn add_shared(&self, graphic: Arc<dyn Graphic>) -> GraphicId {
        let id = GraphicId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().graphics.push((id, graphic));
        id
    }

    /// Swap in a whole frame: the source size and its graphics, under one lock,
    /// then request a redraw.
    pub fn replace<I>(&self, source: ImageSize, graphics: I) -> Vec<GraphicId>
    where
        I: IntoIterator<Item = Arc<dyn Graphic>>,
    {
        let entries: Vec<_> = graphics
            .into_iter()
            .map(|g| (GraphicId(self.next_id.fetch_add(1, Ordering::Relaxed)), g))
            .collect();
        let ids = entries.iter().map(|(id, _)| *id).collect();

        {
            let mut state = self.lock();
            state.source = Some(source);
            state.graphics = entries;
        }
        self.request_redraw();
        ids
    }

    /// Remove a graphic; returns false when `id` is not present.
    pub fn remove(&self, id: GraphicId) -> bool {
        let removed = {
            let mut state = self.lock();
            let before = state.graphics.len();
            state.graphics.retain(|(gid, _)| *gid != id);
            state.graphics.len() != before
        };
        self.request_redraw();
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn request_redraw(&self) {
        self.redraw_requested.store(true, Ordering::Release);
        tracing::trace!("redraw requested");
    }

    /// Consume a pending redraw request.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw_requested.swap(false, Ordering::AcqRel)
    }

    /// The coordinate transform a render pass would use right now.
    pub fn transform(&self) -> OverlayTransform {
        let state = self.lock();
        self.transform_for(&state)
    }

    fn transform_for(&self, state: &OverlayState) -> OverlayTransform {
        let facing = self.facing_mode();
        let orientation = self.orientation();
        match state.source {
            Some(source) => OverlayTransform::new(state.surface, source, facing, orientation),
            None => OverlayTransform::unmapped(state.surface, facing, orientation),
        }
    }

    /// Draw the scrim with its framing-guide hole, then every graphic.
    ///
    /// Graphics are drawn onto `canvas` and onto the off-screen process buffer
    /// within the same locked pass.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let mut state = self.lock();
        let surface = state.surface;

        canvas.fill(self.style.scrim());
        canvas.clear_round_rect(guide_rect(surface, &self.style), self.style.corner_radius);

        let ctx = DrawContext {
            transform: self.transform_for(&state),
            style: &self.style,
        };

        let OverlayState {
            graphics, process, ..
        } = &mut *state;

        // Reuse the buffer while the surface size holds.
        let process = match process.take() {
            Some(mut buffer) if buffer.size() == surface => {
                buffer.reset();
                process.insert(buffer)
            }
            _ => process.insert(RasterCanvas::new(surface.width, surface.height)),
        };

        for (_, graphic) in graphics.iter() {
            graphic.draw(&mut *canvas, &ctx);
            graphic.draw(&mut *process, &ctx);
        }
    }

    /// Render into a fresh transparent image the size of the surface.
    pub fn render_to_image(&self) -> RgbaImage {
        let surface = self.surface();
        let mut canvas = RasterCanvas::new(surface.width, surface.height);
        self.render(&mut canvas);
        canvas.into_image()
    }

    /// Copy of the graphics layer from the most recent render pass.
    pub fn process_snapshot(&self) -> Option<RgbaImage> {
        self.lock().process.as_ref().map(|c| c.image().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::face::FaceDetection;
    use crate::graphic::FaceGraphic;
    use crate::types::BoundingBox;
    use std::sync::atomic::AtomicUsize;

    /// Counts how often it is drawn.
    struct CountingGraphic(Arc<AtomicUsize>);

    impl Graphic for CountingGraphic {
        fn draw(&self, _canvas: &mut dyn Canvas, _ctx: &DrawContext<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn face_graphic() -> FaceGraphic {
        FaceGraphic::new(
            FaceDetection::new(BoundingBox::new(10, 10, 20, 20)),
            ImageSize::new(480, 640),
        )
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(GraphicOverlay::new(0, 100).is_err());
        assert!(GraphicOverlay::new(100, 100).unwrap().resize(100, 0).is_err());
    }

    #[test]
    fn add_remove_clear() {
        let overlay = GraphicOverlay::new(100, 200).unwrap();
        let a = overlay.add(face_graphic());
        let b = overlay.add(face_graphic());
        assert_ne!(a, b);
        assert_eq!(overlay.len(), 2);
        assert!(!overlay.take_redraw_request());

        assert!(overlay.remove(a));
        assert!(!overlay.remove(a));
        assert_eq!(overlay.len(), 1);
        assert!(overlay.take_redraw_request());
        assert!(!overlay.take_redraw_request());

        overlay.clear();
        assert!(overlay.is_empty());
        assert!(overlay.take_redraw_request());
    }

    #[test]
    fn replace_swaps_whole_frame() {
        let overlay = GraphicOverlay::new(100, 200).unwrap();
        let old = overlay.add(face_graphic());

        let frame: Vec<Arc<dyn Graphic>> = vec![Arc::new(face_graphic()), Arc::new(face_graphic())];
        let ids = overlay.replace(ImageSize::new(640, 480), frame);
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains(&old));
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay.source_size(), Some(ImageSize::new(640, 480)));
        assert!(overlay.take_redraw_request());

        assert!(!overlay.remove(old));
        assert!(overlay.remove(ids[0]));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn toggle_facing_mode_flips_state() {
        let overlay = GraphicOverlay::new(100, 200).unwrap();
        assert_eq!(overlay.facing_mode(), FacingMode::Front);
        assert_eq!(overlay.toggle_facing_mode(), FacingMode::Back);
        assert_eq!(overlay.facing_mode(), FacingMode::Back);
        assert_eq!(overlay.toggle_facing_mode(), FacingMode::Front);
    }

    #[test]
    fn clear_then_render_draws_only_background() {
        let overlay = GraphicOverlay::new(1000, 2000).unwrap();
        overlay.add(face_graphic());
        overlay.clear();

        let mut canvas = RecordingCanvas::new(1000, 2000);
        overlay.render(&mut canvas);

        let ops = canvas.ops();
        assert_eq!(ops.len(), 2);
        match &ops[0] {
            DrawOp::Fill { color } => assert_eq!(color.a, 204),
            other => panic!("expected scrim fill, got {:?}", other),
        }
        match &ops[1] {
            DrawOp::ClearRoundRect { rect, radius } => {
                assert!((rect.left - 100.0).abs() < 1e-3);
                assert!((rect.top - 400.0).abs() < 1e-3);
                assert!((rect.right - 900.0).abs() < 1e-3);
                assert!((rect.bottom - 1600.0).abs() < 1e-3);
                assert!((radius - 500.0).abs() < 1e-6);
            }
            other => panic!("expected hole, got {:?}", other),
        }
    }

    #[test]
    fn render_draws_each_graphic_twice_in_order() {
        let overlay = GraphicOverlay::new(100, 200).unwrap();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        overlay.add(CountingGraphic(first.clone()));
        overlay.add(CountingGraphic(second.clone()));

        let mut canvas = RecordingCanvas::new(100, 200);
        overlay.render(&mut canvas);
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn process_buffer_matches_surface_and_is_reused() {
        let overlay = GraphicOverlay::new(64, 48).unwrap();
        assert!(overlay.process_snapshot().is_none());

        overlay.add(face_graphic());
        overlay.render(&mut RecordingCanvas::new(64, 48));
        let snap = overlay.process_snapshot().unwrap();
        assert_eq!(snap.dimensions(), (64, 48));
        // The guide border lands on the process buffer; the scrim does not.
        assert!(snap.pixels().any(|p| p[3] == 0xFF));
        assert!(snap.pixels().all(|p| p[3] == 0 || p[3] == 0xFF));

        // Second pass at the same size reuses the buffer with nothing left over.
        overlay.clear();
        overlay.render(&mut RecordingCanvas::new(64, 48));
        let snap = overlay.process_snapshot().unwrap();
        assert_eq!(snap.dimensions(), (64, 48));
        assert!(snap.pixels().all(|p| p[3] == 0));

        overlay.resize(32, 24).unwrap();
        overlay.render(&mut RecordingCanvas::new(32, 24));
        assert_eq!(overlay.process_snapshot().unwrap().dimensions(), (32, 24));
    }

    #[test]
    fn transform_follows_source_and_facing() {
        let overlay = GraphicOverlay::new(1080, 1920).unwrap();
        assert!(overlay.transform().mapping().is_none());

        overlay.set_source_size(ImageSize::new(480, 640));
        overlay.set_orientation(Orientation::Landscape);
        let t = overlay.transform();
        assert!(t.mapping().is_some());
        assert_eq!(t.orientation(), Orientation::Landscape);
        assert_eq!(t.facing(), FacingMode::Front);

        overlay.toggle_facing_mode();
        assert_eq!(overlay.transform().facing(), FacingMode::Back);
    }

    #[test]
    fn overlay_is_shareable_across_threads() {
        let overlay = Arc::new(GraphicOverlay::new(100, 100).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let overlay = overlay.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        overlay.add(face_graphic());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(overlay.len(), 100);
    }
}

//! Per-frame handoff from the capture pipeline to the overlay.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::face::Frame;
use crate::graphic::{FaceGraphic, Graphic};
use crate::overlay::{GraphicId, GraphicOverlay};

/// Replaces the overlay's graphics with one [`FaceGraphic`] per detected face,
/// once per camera frame.
pub struct FrameFeed {
    overlay: Arc<GraphicOverlay>,
    frames: u64,
    faces: u64,
    busy: Duration,
}

impl FrameFeed {
    pub fn new(overlay: Arc<GraphicOverlay>) -> Self {
        Self {
            overlay,
            frames: 0,
            faces: 0,
            busy: Duration::ZERO,
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Replace the overlay's graphics with the frame's faces and request a redraw.
    pub fn present(&mut self, frame: Frame) -> Vec<GraphicId> {
        let start = Instant::now();

        let source = frame.source;
        let ids = self.overlay.replace(
            source,
            frame
                .faces
                .into_iter()
                .map(|face| Arc::new(FaceGraphic::new(face, source)) as Arc<dyn Graphic>),
        );

        self.busy += start.elapsed();
        self.frames += 1;
        self.faces += ids.len() as u64;

        if self.frames % 300 == 0 {
            tracing::info!(
                frames = self.frames,
                faces_per_frame = format!("{:.2}", self.faces as f64 / self.frames as f64),
                present_us_per_frame = format!(
                    "{:.1}",
                    self.busy.as_secs_f64() * 1e6 / self.frames as f64
                ),
                "frame feed stats"
            );
        }

        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FaceDetection;
    use crate::types::{BoundingBox, ImageSize};

    fn frame(faces: usize) -> Frame {
        Frame::new(
            ImageSize::new(480, 640),
            (0..faces)
                .map(|i| FaceDetection::new(BoundingBox::new(i as i32, 0, i as i32 + 10, 10)))
                .collect(),
        )
    }

    #[test]
    fn present_replaces_previous_frame() {
        let overlay = Arc::new(GraphicOverlay::new(1080, 1920).unwrap());
        let mut feed = FrameFeed::new(overlay.clone());

        assert_eq!(feed.present(frame(3)).len(), 3);
        assert_eq!(overlay.len(), 3);
        assert!(overlay.take_redraw_request());

        assert_eq!(feed.present(frame(1)).len(), 1);
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.source_size(), Some(ImageSize::new(480, 640)));
        assert_eq!(feed.frames_presented(), 2);
    }

    #[test]
    fn empty_frame_still_requests_redraw() {
        let overlay = Arc::new(GraphicOverlay::new(100, 100).unwrap());
        let mut feed = FrameFeed::new(overlay.clone());
        feed.present(frame(2));
        overlay.take_redraw_request();

        assert!(feed.present(frame(0)).is_empty());
        assert!(overlay.is_empty());
        assert!(overlay.take_redraw_request());
    }

    #[test]
    fn render_never_sees_a_partial_frame() {
        use crate::canvas::RecordingCanvas;
        use std::sync::atomic::{AtomicBool, Ordering};

        let overlay = Arc::new(GraphicOverlay::new(480, 640).unwrap());
        let mut feed = FrameFeed::new(overlay.clone());
        feed.present(frame(3));

        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let done = done.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    feed.present(frame(3));
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        while !done.load(Ordering::SeqCst) {
            let mut canvas = RecordingCanvas::new(480, 640);
            overlay.render(&mut canvas);
            assert_eq!(canvas.round_rects().count(), 3);
        }
        writer.join().unwrap();
    }
}

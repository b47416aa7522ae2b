//! Face detection backends.
//!
//! The overlay only needs [`FaceDetection`] values; anything able to produce them
//! can implement [`FaceDetector`]. [`RustfaceDetector`] wraps the SeetaFace
//! engine from the `rustface` crate, which reports bounding boxes only, so
//! faces it finds carry no contours or classifier probabilities.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, GrayImage};

use crate::error::{Error, Result};
use crate::face::{FaceDetection, Frame};
use crate::types::{BoundingBox, ImageSize};

pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> Vec<FaceDetection>;

    /// Detect faces in `image` and package them as a frame.
    fn detect_frame(&self, image: &DynamicImage) -> Frame {
        let gray = image.to_luma8();
        let faces = self.detect(&gray);
        Frame::new(ImageSize::new(gray.width(), gray.height()), faces)
    }
}

/// SeetaFace frontal-face detector settings.
#[derive(Debug, Clone, Copy)]
pub struct RustfaceSettings {
    pub min_face_size: u32,
    pub score_thresh: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: (u32, u32),
}

impl Default for RustfaceSettings {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

pub struct RustfaceDetector {
    model: rustface::Model,
    settings: RustfaceSettings,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file such as `seeta_fd_frontal_v1.0.bin`.
    pub fn load<P: AsRef<Path>>(path: P, settings: RustfaceSettings) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| Error::Detector(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "loaded SeetaFace model");
        Ok(Self { model, settings })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<FaceDetection> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.settings.min_face_size);
        detector.set_score_thresh(self.settings.score_thresh);
        detector.set_pyramid_scale_factor(self.settings.pyramid_scale_factor);
        let (step_x, step_y) = self.settings.slide_window_step;
        detector.set_slide_window_step(step_x, step_y);

        let (width, height) = gray.dimensions();
        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        tracing::debug!(count = faces.len(), "rustface detection");

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceDetection::new(BoundingBox::from_xywh(
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                ))
            })
            .collect()
    }
}

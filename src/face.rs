//! Face detection results as consumed by the overlay.
//!
//! These types describe what an external face detector reports for one face in
//! one frame. Every classifier output is optional: a detector that was not asked
//! to classify smiles simply leaves `smiling_probability` as `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, ImageSize, Point};

/// Named facial contours a detector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    Face,
    LeftEyebrowTop,
    LeftEyebrowBottom,
    RightEyebrowTop,
    RightEyebrowBottom,
    LeftEye,
    RightEye,
    UpperLipTop,
    UpperLipBottom,
    LowerLipTop,
    LowerLipBottom,
    NoseBridge,
    NoseBottom,
    LeftCheek,
    RightCheek,
}

/// An ordered sequence of points outlining one facial feature.
///
/// An empty contour is valid and draws nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Head rotation in degrees about the X (pitch), Y (yaw), and Z (roll) axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadAngles {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

/// One detected face in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,

    #[serde(default)]
    pub contours: BTreeMap<ContourKind, Contour>,

    #[serde(default)]
    pub smiling_probability: Option<f32>,

    #[serde(default)]
    pub left_eye_open_probability: Option<f32>,

    #[serde(default)]
    pub right_eye_open_probability: Option<f32>,

    #[serde(default)]
    pub head_angles: HeadAngles,

    /// Detector-assigned id. Carried through for logging only; faces are not
    /// matched across frames.
    #[serde(default)]
    pub tracking_id: Option<u32>,
}

impl FaceDetection {
    /// A detection with only a bounding box, as produced by box-only detectors.
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            contours: BTreeMap::new(),
            smiling_probability: None,
            left_eye_open_probability: None,
            right_eye_open_probability: None,
            head_angles: HeadAngles::default(),
            tracking_id: None,
        }
    }

    pub fn with_contour(mut self, kind: ContourKind, points: Vec<Point>) -> Self {
        self.contours.insert(kind, Contour::new(points));
        self
    }

    pub fn with_smiling_probability(mut self, p: f32) -> Self {
        self.smiling_probability = Some(p);
        self
    }

    pub fn with_eye_open_probabilities(mut self, left: Option<f32>, right: Option<f32>) -> Self {
        self.left_eye_open_probability = left;
        self.right_eye_open_probability = right;
        self
    }

    pub fn contour(&self, kind: ContourKind) -> Option<&Contour> {
        self.contours.get(&kind)
    }
}

/// The capture pipeline's per-frame handoff: source image size plus every face
/// found in that image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub source: ImageSize,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
}

impl Frame {
    pub fn new(source: ImageSize, faces: Vec<FaceDetection>) -> Self {
        Self { source, faces }
    }

    /// Parse a frame from its JSON representation.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a frame from a JSON file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

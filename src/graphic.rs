//! Graphics hosted by the overlay.
//!
//! A [`Graphic`] draws itself onto a [`Canvas`] given the pass-wide
//! [`DrawContext`]. Drawing must not mutate the graphic: the overlay draws every
//! graphic twice per pass (visible surface and process buffer).

use crate::canvas::{Canvas, Stroke};
use crate::color::Color;
use crate::face::{ContourKind, FaceDetection};
use crate::style::OverlayStyle;
use crate::transform::OverlayTransform;
use crate::types::{ImageSize, RectF};

/// Lip contours highlighted while smiling, with their colours.
pub const SMILE_CONTOURS: [(ContourKind, Color); 4] = [
    (ContourKind::LowerLipBottom, Color::WHITE),
    (ContourKind::LowerLipTop, Color::YELLOW),
    (ContourKind::UpperLipBottom, Color::GREEN),
    (ContourKind::UpperLipTop, Color::CYAN),
];

/// Contours highlighted on a blink.
///
/// The blink signal is the left-eye probability while these are the right-eye
/// contours; with a mirrored front camera the detector's "left" eye appears on
/// the viewer's right.
pub const BLINK_CONTOURS: [(ContourKind, Color); 3] = [
    (ContourKind::RightEye, Color::DARK_GRAY),
    (ContourKind::RightEyebrowBottom, Color::GRAY),
    (ContourKind::RightEyebrowTop, Color::GREEN),
];

/// Everything shared by the graphics drawn in one render pass.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub transform: OverlayTransform,
    pub style: &'a OverlayStyle,
}

pub trait Graphic: Send + Sync {
    fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>);
}

/// The framing guide: the surface inset by the style's margins.
pub fn guide_rect(surface: ImageSize, style: &OverlayStyle) -> RectF {
    RectF::inset_from(
        surface.width as f32,
        surface.height as f32,
        style.horizontal_margin,
        style.vertical_margin,
    )
}

/// Solid border when the face sits inside the guide, dashed otherwise.
pub fn guide_stroke(face_inside: bool, style: &OverlayStyle) -> Stroke {
    if face_inside {
        Stroke::solid(style.guide_color, style.guide_stroke_width)
    } else {
        Stroke::dashed(style.guide_color, style.guide_stroke_width, style.guide_dash)
    }
}

/// Which reactive highlights a face triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceEffects {
    pub smile: bool,
    pub blink: bool,
}

impl FaceEffects {
    pub fn evaluate(face: &FaceDetection, style: &OverlayStyle) -> Self {
        Self {
            smile: face
                .smiling_probability
                .is_some_and(|p| p > style.smile_threshold),
            blink: face
                .left_eye_open_probability
                .is_some_and(|p| p < style.blink_threshold),
        }
    }
}

/// One detected face, drawn as the framing-guide border plus highlights.
#[derive(Debug, Clone)]
pub struct FaceGraphic {
    face: FaceDetection,
    source: ImageSize,
}

impl FaceGraphic {
    pub fn new(face: FaceDetection, source: ImageSize) -> Self {
        Self { face, source }
    }

    fn draw_contour(
        &self,
        canvas: &mut dyn Canvas,
        transform: &OverlayTransform,
        kind: ContourKind,
        color: Color,
        width: f32,
    ) {
        let Some(contour) = self.face.contour(kind) else {
            return;
        };
        if contour.is_empty() {
            return;
        }

        let points: Vec<_> = contour.points.iter().map(|p| transform.translate(*p)).collect();
        canvas.stroke_path(&points, &Stroke::solid(color, width));
    }
}

impl Graphic for FaceGraphic {
    fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        let style = ctx.style;
        let transform = ctx.transform.for_source(self.source);

        // The back-camera mapping swaps left and right; compare the covered region.
        let mapped = transform.map_box(&self.face.bounding_box).normalized();
        let guide = guide_rect(transform.surface(), style);
        let inside = guide.contains(&mapped);

        tracing::debug!(
            tracking_id = ?self.face.tracking_id,
            head_x = ?self.face.head_angles.x,
            inside,
            "face graphic"
        );

        canvas.stroke_round_rect(guide, style.corner_radius, &guide_stroke(inside, style));

        let effects = FaceEffects::evaluate(&self.face, style);
        if effects.smile {
            for (kind, color) in SMILE_CONTOURS {
                self.draw_contour(canvas, &transform, kind, color, style.contour_stroke_width);
            }
        }
        if effects.blink {
            for (kind, color) in BLINK_CONTOURS {
                self.draw_contour(canvas, &transform, kind, color, style.contour_stroke_width);
            }
        }
    }
}

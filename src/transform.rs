//! Image-space to view-space coordinate mapping.
//!
//! The camera image is scaled to cover the overlay surface completely
//! (fill-crop), centred, and mirrored horizontally when the front camera is in
//! use. The mapping is computed once per render pass as an [`OverlayTransform`]
//! value and handed to every graphic drawn in that pass.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, ImageSize, Point, RectF};

/// Which camera feeds the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    #[default]
    Front,
    Back,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Back,
            FacingMode::Back => FacingMode::Front,
        }
    }

    pub fn is_front(self) -> bool {
        self == FacingMode::Front
    }
}

/// Device orientation while the surface is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Fill-crop scale and centring offsets for one source/surface pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOffset {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ScaleOffset {
    /// Compute the scale that makes a `source_w` x `source_h` image cover the
    /// surface, plus the offsets that centre the overflow.
    pub fn fill_crop(surface_w: f32, surface_h: f32, source_w: f32, source_h: f32) -> Self {
        let scale_x = surface_w / source_w;
        let scale_y = surface_h / source_h;
        let scale = scale_x.max(scale_y);

        let offset_x = (surface_w - (source_w * scale).ceil()) / 2.0;
        let offset_y = (surface_h - (source_h * scale).ceil()) / 2.0;

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }
}

/// Per-pass mapping from source-image pixels to overlay-surface pixels.
///
/// An *unmapped* transform (no source size known yet) passes points through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    surface: ImageSize,
    source: Option<ImageSize>,
    facing: FacingMode,
    orientation: Orientation,
    mapping: Option<ScaleOffset>,
}

impl OverlayTransform {
    /// Build the transform for a frame whose source image is `source`.
    ///
    /// In portrait the camera buffer is rotated relative to the display, so the
    /// image height lines up with the surface width and vice versa.
    pub fn new(
        surface: ImageSize,
        source: ImageSize,
        facing: FacingMode,
        orientation: Orientation,
    ) -> Self {
        let (source_w, source_h) = oriented_source(source, orientation);
        let mapping = if source.is_empty() {
            None
        } else {
            Some(ScaleOffset::fill_crop(
                surface.width as f32,
                surface.height as f32,
                source_w,
                source_h,
            ))
        };

        Self {
            surface,
            source: Some(source),
            facing,
            orientation,
            mapping,
        }
    }

    /// A pass-through transform used before any source size is known.
    pub fn unmapped(surface: ImageSize, facing: FacingMode, orientation: Orientation) -> Self {
        Self {
            surface,
            source: None,
            facing,
            orientation,
            mapping: None,
        }
    }

    /// The same surface, facing, and orientation applied to another source size.
    pub fn for_source(&self, source: ImageSize) -> Self {
        if self.source == Some(source) {
            *self
        } else {
            Self::new(self.surface, source, self.facing, self.orientation)
        }
    }

    pub fn surface(&self) -> ImageSize {
        self.surface
    }

    pub fn source(&self) -> Option<ImageSize> {
        self.source
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn mapping(&self) -> Option<ScaleOffset> {
        self.mapping
    }

    fn center_x(&self) -> f32 {
        self.surface.width as f32 / 2.0
    }

    /// Map a detector bounding box into view space.
    ///
    /// Left and right trade places during scaling, which yields a box mirrored
    /// relative to the source. Front mode then reflects it about the surface's
    /// vertical centre line.
    pub fn map_box(&self, bbox: &BoundingBox) -> RectF {
        let m = self.mapping.unwrap_or(ScaleOffset {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        });

        let mut mapped = RectF::new(
            bbox.right as f32 * m.scale + m.offset_x,
            bbox.top as f32 * m.scale + m.offset_y,
            bbox.left as f32 * m.scale + m.offset_x,
            bbox.bottom as f32 * m.scale + m.offset_y,
        );

        if self.facing.is_front() {
            let c = self.center_x();
            mapped.left = c + (c - mapped.left);
            mapped.right = c - (mapped.right - c);
        }
        mapped
    }

    pub fn translate_x(&self, x: f32) -> f32 {
        match self.mapping {
            Some(m) if self.facing.is_front() => {
                let c = self.center_x();
                c - (x * m.scale + m.offset_x - c)
            }
            Some(m) => x * m.scale + m.offset_x,
            None => x,
        }
    }

    pub fn translate_y(&self, y: f32) -> f32 {
        match self.mapping {
            Some(m) => y * m.scale + m.offset_y,
            None => y,
        }
    }

    pub fn translate(&self, p: Point) -> Point {
        Point::new(self.translate_x(p.x), self.translate_y(p.y))
    }
}

fn oriented_source(source: ImageSize, orientation: Orientation) -> (f32, f32) {
    match orientation {
        Orientation::Landscape => (source.width as f32, source.height as f32),
        Orientation::Portrait => (source.height as f32, source.width as f32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fill_crop_covers_surface() {
        // 640x480 into 1280x720: width needs 2.0, height needs 1.5 -> take 2.0.
        let m = ScaleOffset::fill_crop(1280.0, 720.0, 640.0, 480.0);
        assert!(approx(m.scale, 2.0));
        assert!(approx(m.offset_x, 0.0));
        assert!(approx(m.offset_y, (720.0 - 960.0) / 2.0));
    }

    #[test]
    fn portrait_swaps_source_axes() {
        let surface = ImageSize::new(720, 1280);
        let source = ImageSize::new(640, 480);
        let t = OverlayTransform::new(surface, source, FacingMode::Back, Orientation::Portrait);
        let m = t.mapping().unwrap();
        // Portrait treats the source as 480 wide, 640 tall: scale = max(1.5, 2.0).
        assert!(approx(m.scale, 2.0));
        assert!(approx(m.offset_x, (720.0 - 960.0) / 2.0));
        assert!(approx(m.offset_y, 0.0));

        let l = OverlayTransform::new(surface, source, FacingMode::Back, Orientation::Landscape);
        let m = l.mapping().unwrap();
        assert!(approx(m.scale, 1280.0 / 480.0));
    }

    #[test]
    fn back_mode_box_swaps_left_and_right() {
        let surface = ImageSize::new(480, 640);
        let t = OverlayTransform::new(
            surface,
            ImageSize::new(480, 640),
            FacingMode::Back,
            Orientation::Landscape,
        );
        let r = t.map_box(&BoundingBox::new(10, 20, 110, 220));
        assert!(approx(r.left, 110.0));
        assert!(approx(r.right, 10.0));
        assert!(approx(r.top, 20.0));
        assert!(approx(r.bottom, 220.0));
    }

    #[test]
    fn front_mode_box_reflects_about_center() {
        let surface = ImageSize::new(480, 640);
        let t = OverlayTransform::new(
            surface,
            ImageSize::new(480, 640),
            FacingMode::Front,
            Orientation::Landscape,
        );
        let r = t.map_box(&BoundingBox::new(10, 20, 110, 220));
        // Back-mode left/right were 110/10; reflect about x = 240.
        assert!(approx(r.left, 370.0));
        assert!(approx(r.right, 470.0));
        assert!(approx(r.top, 20.0));
        assert!(approx(r.bottom, 220.0));
    }

    #[test]
    fn mapping_is_idempotent() {
        let surface = ImageSize::new(1080, 1920);
        let source = ImageSize::new(480, 640);
        let bbox = BoundingBox::new(100, 150, 300, 400);
        let a = OverlayTransform::new(surface, source, FacingMode::Front, Orientation::Portrait);
        let b = OverlayTransform::new(surface, source, FacingMode::Front, Orientation::Portrait);
        assert_eq!(a, b);
        assert_eq!(a.map_box(&bbox), a.map_box(&bbox));
        assert_eq!(a.map_box(&bbox), b.map_box(&bbox));
    }

    #[test]
    fn front_and_back_translate_are_mirror_images() {
        let surface = ImageSize::new(1080, 1920);
        let source = ImageSize::new(480, 640);
        let front = OverlayTransform::new(surface, source, FacingMode::Front, Orientation::Portrait);
        let back = OverlayTransform::new(surface, source, FacingMode::Back, Orientation::Portrait);
        let c = surface.width as f32 / 2.0;

        for p in [Point::new(0.0, 0.0), Point::new(123.0, 456.0), Point::new(640.0, 480.0)] {
            let f = front.translate(p);
            let b = back.translate(p);
            assert!(approx(f.x - c, c - b.x), "x not mirrored for {:?}", p);
            assert!(approx(f.y, b.y));
        }
    }

    #[test]
    fn unmapped_transform_passes_points_through() {
        let t = OverlayTransform::unmapped(
            ImageSize::new(1080, 1920),
            FacingMode::Front,
            Orientation::Portrait,
        );
        assert!(t.mapping().is_none());
        assert_eq!(t.translate(Point::new(12.5, 40.0)), Point::new(12.5, 40.0));
    }

    #[test]
    fn for_source_reuses_matching_transform() {
        let surface = ImageSize::new(1080, 1920);
        let t = OverlayTransform::new(
            surface,
            ImageSize::new(480, 640),
            FacingMode::Back,
            Orientation::Portrait,
        );
        assert_eq!(t.for_source(ImageSize::new(480, 640)), t);

        let other = t.for_source(ImageSize::new(720, 1280));
        assert_eq!(other.source(), Some(ImageSize::new(720, 1280)));
        assert_eq!(other.facing(), FacingMode::Back);
        assert_ne!(other.mapping(), t.mapping());
    }

    #[test]
    fn toggle_flips_facing() {
        assert_eq!(FacingMode::Front.toggled(), FacingMode::Back);
        assert_eq!(FacingMode::Back.toggled(), FacingMode::Front);
    }
}

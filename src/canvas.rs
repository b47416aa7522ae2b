//! Drawing targets for overlay graphics.
//!
//! [`Canvas`] is the small set of primitives the overlay needs. Two targets
//! implement it:
//!
//! - [`RasterCanvas`] rasterises into an RGBA image buffer.
//! - [`RecordingCanvas`] keeps the calls as a list of [`DrawOp`]s, which makes
//!   the output of a render pass easy to inspect.

use image::{Pixel, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::types::{ImageSize, Point, RectF};

/// Alternating on/off lengths along a stroked outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashPattern {
    pub on: f32,
    pub off: f32,
}

impl DashPattern {
    pub const fn new(on: f32, off: f32) -> Self {
        Self { on, off }
    }

    /// Whether the outline is painted `distance` units from its start.
    pub fn is_on(&self, distance: f32) -> bool {
        let period = self.on + self.off;
        if period <= 0.0 {
            return true;
        }
        distance.rem_euclid(period) < self.on
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub dash: Option<DashPattern>,
}

impl Stroke {
    pub const fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Color, width: f32, dash: DashPattern) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

/// Drawing capability shared by every overlay target.
pub trait Canvas {
    fn size(&self) -> ImageSize;

    /// Paint the whole surface with `color`, composited over existing content.
    fn fill(&mut self, color: Color);

    /// Make every pixel inside the rounded rectangle fully transparent.
    fn clear_round_rect(&mut self, rect: RectF, radius: f32);

    fn stroke_round_rect(&mut self, rect: RectF, radius: f32, stroke: &Stroke);

    /// Stroke an open polyline through `points`.
    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Fill {
        color: Color,
    },
    ClearRoundRect {
        rect: RectF,
        radius: f32,
    },
    StrokeRoundRect {
        rect: RectF,
        radius: f32,
        stroke: Stroke,
    },
    StrokePath {
        points: Vec<Point>,
        stroke: Stroke,
    },
}

/// A canvas that records calls instead of drawing them.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: ImageSize,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: ImageSize::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Every stroked path, in draw order.
    pub fn paths(&self) -> impl Iterator<Item = (&[Point], &Stroke)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::StrokePath { points, stroke } => Some((points.as_slice(), stroke)),
            _ => None,
        })
    }

    /// Every stroked rounded rectangle, in draw order.
    pub fn round_rects(&self) -> impl Iterator<Item = (&RectF, &Stroke)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::StrokeRoundRect { rect, stroke, .. } => Some((rect, stroke)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> ImageSize {
        self.size
    }

    fn fill(&mut self, color: Color) {
        self.ops.push(DrawOp::Fill { color });
    }

    fn clear_round_rect(&mut self, rect: RectF, radius: f32) {
        self.ops.push(DrawOp::ClearRoundRect { rect, radius });
    }

    fn stroke_round_rect(&mut self, rect: RectF, radius: f32, stroke: &Stroke) {
        self.ops.push(DrawOp::StrokeRoundRect {
            rect,
            radius,
            stroke: *stroke,
        });
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        self.ops.push(DrawOp::StrokePath {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }
}

/// A canvas backed by an RGBA image buffer.
///
/// Strokes are stamped as filled discs along the outline and replace the
/// pixels they cover; `fill` composites over what is already there.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    /// A fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Reset every pixel to transparent, keeping the allocation.
    pub fn reset(&mut self) {
        let clear: Rgba<u8> = Color::TRANSPARENT.into();
        for p in self.image.pixels_mut() {
            *p = clear;
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) {
        let (w, h) = self.image.dimensions();
        // Discs larger than the canvas cover it either way.
        let radius = (stroke.width / 2.0).max(0.5).min(w.max(h) as f32);
        let color: Rgba<u8> = stroke.color.into();
        let bounds = RectF::new(-radius, -radius, w as f32 + radius, h as f32 + radius);
        let mut travelled = 0.0f32;

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = a.distance(&b);
            if !length.is_finite() || length <= f32::EPSILON {
                continue;
            }

            // Only the visible stretch is stepped; the dash phase still counts
            // the whole segment.
            if let Some((t0, t1)) = clip_segment(a, b, &bounds) {
                let at = |t: f32| if t <= 0.0 { a } else if t >= 1.0 { b } else { a.lerp(b, t) };
                let (start, end) = (at(t0), at(t1));
                let visible = length * (t1 - t0);
                let steps = visible.ceil().max(1.0) as usize;
                for i in 0..=steps {
                    let u = i as f32 / steps as f32;
                    let along = travelled + length * t0 + visible * u;
                    if stroke.dash.map_or(true, |d| d.is_on(along)) {
                        self.stamp(start.lerp(end, u), radius, color);
                    }
                }
            }
            travelled += length;
        }
    }

    fn stamp(&mut self, center: Point, radius: f32, color: Rgba<u8>) {
        imageproc::drawing::draw_filled_circle_mut(
            &mut self.image,
            (center.x.round() as i32, center.y.round() as i32),
            radius.round() as i32,
            color,
        );
    }
}

/// Parameter range of the segment `a..b` lying inside `bounds`
/// (Liang-Barsky), or `None` when it misses entirely.
fn clip_segment(a: Point, b: Point, bounds: &RectF) -> Option<(f32, f32)> {
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-d.x, a.x - bounds.left),
        (d.x, bounds.right - a.x),
        (-d.y, a.y - bounds.top),
        (d.y, bounds.bottom - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }

    (t0.is_finite() && t1.is_finite() && t0 <= t1).then_some((t0, t1))
}

impl Canvas for RasterCanvas {
    fn size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }

    fn fill(&mut self, color: Color) {
        let src: Rgba<u8> = color.into();
        for p in self.image.pixels_mut() {
            p.blend(&src);
        }
    }

    fn clear_round_rect(&mut self, rect: RectF, radius: f32) {
        let shape = RoundRect::new(rect, radius);
        let (w, h) = self.image.dimensions();
        let x0 = shape.rect.left.floor().max(0.0) as u32;
        let y0 = shape.rect.top.floor().max(0.0) as u32;
        let x1 = (shape.rect.right.ceil().max(0.0) as u32).min(w);
        let y1 = (shape.rect.bottom.ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                if shape.contains(Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.image.put_pixel(x, y, Color::TRANSPARENT.into());
                }
            }
        }
    }

    fn stroke_round_rect(&mut self, rect: RectF, radius: f32, stroke: &Stroke) {
        let outline = RoundRect::new(rect, radius).outline();
        self.stroke_polyline(&outline, stroke);
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        self.stroke_polyline(points, stroke);
    }
}

/// A normalised rectangle with its corner radius clamped to fit.
#[derive(Debug, Clone, Copy)]
struct RoundRect {
    rect: RectF,
    radius: f32,
}

impl RoundRect {
    fn new(rect: RectF, radius: f32) -> Self {
        let rect = rect.normalized();
        let radius = radius.max(0.0).min(rect.width() / 2.0).min(rect.height() / 2.0);
        Self { rect, radius }
    }

    fn contains(&self, p: Point) -> bool {
        if !self.rect.contains_point(p) {
            return false;
        }
        let r = self.radius;
        let cx = p.x.max(self.rect.left + r).min(self.rect.right - r);
        let cy = p.y.max(self.rect.top + r).min(self.rect.bottom - r);
        p.distance(&Point::new(cx, cy)) <= r
    }

    /// Closed outline, clockwise from the end of the top-left corner.
    fn outline(&self) -> Vec<Point> {
        let RectF {
            left,
            top,
            right,
            bottom,
        } = self.rect;
        let r = self.radius;
        let segments = ((r / 4.0).ceil() as usize).clamp(1, 64);

        // Corner centres with the start angle of each quarter arc.
        let corners = [
            (Point::new(right - r, top + r), -90.0f32),
            (Point::new(right - r, bottom - r), 0.0),
            (Point::new(left + r, bottom - r), 90.0),
            (Point::new(left + r, top + r), 180.0),
        ];

        let mut points = Vec::with_capacity(corners.len() * (segments + 1) + 1);
        points.push(Point::new(left + r, top));
        for (center, start) in corners {
            for i in 0..=segments {
                let angle = (start + 90.0 * i as f32 / segments as f32).to_radians();
                points.push(Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()));
            }
        }
        points.push(Point::new(left + r, top));
        points
    }
}

use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates, in image or view space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Pixel dimensions of a source image or a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An axis-aligned face box in source-image pixels, as reported by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a box from a top-left corner and a size, the layout most detectors use.
    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, x + width as i32, y + height as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A view-space rectangle with floating-point edges.
///
/// Edges are stored as given: a mirrored mapping may legitimately produce
/// `left > right`, so nothing here normalises them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle inset from a `width` x `height` surface by fractional margins.
    pub fn inset_from(width: f32, height: f32, horizontal: f32, vertical: f32) -> Self {
        let dx = width * horizontal;
        let dy = height * vertical;
        Self::new(dx, dy, width - dx, height - dy)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Same rectangle with `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// True when `other` lies entirely within this rectangle.
    ///
    /// This rectangle must be non-empty; `other` is compared edge by edge
    /// without normalisation.
    pub fn contains(&self, other: &RectF) -> bool {
        !self.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let mid = a.lerp(b, 0.5);
        assert_eq!(mid, Point::new(2.0, 3.0));
    }

    #[test]
    fn rect_contains_is_inclusive_on_edges() {
        let guide = RectF::new(10.0, 20.0, 90.0, 80.0);
        assert!(guide.contains(&RectF::new(10.0, 20.0, 90.0, 80.0)));
        assert!(guide.contains(&RectF::new(30.0, 30.0, 60.0, 60.0)));
        assert!(!guide.contains(&RectF::new(9.9, 30.0, 60.0, 60.0)));
        assert!(!guide.contains(&RectF::new(30.0, 30.0, 60.0, 80.5)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let empty = RectF::new(50.0, 50.0, 50.0, 90.0);
        assert!(empty.is_empty());
        assert!(!empty.contains(&RectF::new(50.0, 60.0, 50.0, 70.0)));
    }

    #[test]
    fn inverted_rect_is_compared_edge_by_edge() {
        // A mirrored box with left > right still fits when every edge is inside.
        let guide = RectF::new(0.0, 0.0, 100.0, 100.0);
        assert!(guide.contains(&RectF::new(80.0, 10.0, 20.0, 90.0)));
        assert!(guide.contains(&RectF::new(80.0, 10.0, -20.0, 90.0)));
        assert!(!guide.contains(&RectF::new(80.0, 10.0, -20.0, 90.0).normalized()));
    }

    #[test]
    fn bounding_box_from_xywh() {
        let b = BoundingBox::from_xywh(400, 800, 280, 400);
        assert_eq!(b, BoundingBox::new(400, 800, 680, 1200));
        assert_eq!(b.width(), 280);
        assert_eq!(b.height(), 400);
    }

    #[test]
    fn inset_rect_margins() {
        let r = RectF::inset_from(1000.0, 2000.0, 0.1, 0.2);
        assert!((r.left - 100.0).abs() < 1e-3);
        assert!((r.right - 900.0).abs() < 1e-3);
        assert!((r.top - 400.0).abs() < 1e-3);
        assert!((r.bottom - 1600.0).abs() < 1e-3);
    }
}

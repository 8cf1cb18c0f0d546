//! Geometry
//!
//! Document-space rectangles and scroll options.

use serde::{Deserialize, Serialize};

/// Rectangle in document coordinates (px)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Rects overlap or share an edge
    pub fn touches(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Get intersection rect
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.touches(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Rect::from_xywh(x, y, right - x, bottom - y))
    }
}

/// Scroll behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
    Instant,
}

/// Scroll options for `Host::scroll_to`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOptions {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

impl ScrollOptions {
    pub fn smooth(top: f64) -> Self {
        Self { top, behavior: ScrollBehavior::Smooth }
    }

    pub fn instant(top: f64) -> Self {
        Self { top, behavior: ScrollBehavior::Instant }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.area(), 5000.0);
    }

    #[test]
    fn test_intersection() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = Rect::from_xywh(50.0, 50.0, 100.0, 100.0);
        let c = Rect::from_xywh(200.0, 200.0, 50.0, 50.0);

        assert_eq!(a.intersection(&b), Some(Rect::from_xywh(50.0, 50.0, 50.0, 50.0)));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_edge_adjacent_touches_with_zero_area() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let below = Rect::from_xywh(0.0, 100.0, 100.0, 40.0);

        assert!(a.touches(&below));
        assert_eq!(a.intersection(&below).map(|r| r.area()), Some(0.0));
    }
}

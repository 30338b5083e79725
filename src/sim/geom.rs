//! Axis-aligned rectangle geometry for platforms, monsters, pickups and the player
//!
//! Screen space: x grows to the right, y grows downward. A rect's `pos` is its
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap of the horizontal spans (touching edges don't count)
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    /// Strict overlap of both spans
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.bottom() > other.top() && self.top() < other.bottom()
    }
}

/// Swept test: did a bottom edge moving from `prev_bottom` to `curr_bottom`
/// cross the horizontal line `surface` from above?
#[inline]
pub fn crossed_from_above(prev_bottom: f32, curr_bottom: f32, surface: f32) -> bool {
    prev_bottom <= surface && curr_bottom >= surface
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0))); // touching
        assert!(!a.overlaps(&Rect::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_overlaps_x_ignores_vertical() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps_x(&Rect::new(5.0, 500.0, 10.0, 10.0)));
    }

    #[test]
    fn test_swept_crossing() {
        // Thin surface skipped over by a single large step is still caught
        assert!(crossed_from_above(90.0, 130.0, 100.0));
        assert!(crossed_from_above(100.0, 100.0, 100.0));
        assert!(!crossed_from_above(101.0, 130.0, 100.0));
        assert!(!crossed_from_above(80.0, 95.0, 100.0));
    }
}

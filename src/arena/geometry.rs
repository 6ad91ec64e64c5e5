//! Pixel-space primitives shared by the arena and the renderer adapters.

/// Top-left corner of an entity, in arena pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box. `right` / `bottom` are exclusive edges (`left + width`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn at(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }
    pub fn top(&self) -> i32 {
        self.origin.y
    }
    pub fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width)
    }
    pub fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height)
    }

    /// Strict overlap test: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (10, 20, 40, 60));
    }

    #[test]
    fn test_overlap_requires_shared_area() {
        let a = Rect::new(0, 0, 50, 50);
        assert!(a.overlaps(&Rect::new(49, 49, 10, 10)));
        assert!(a.overlaps(&Rect::new(10, 10, 5, 5)));
        // edge-touching on either axis is not an overlap
        assert!(!a.overlaps(&Rect::new(50, 0, 10, 10)));
        assert!(!a.overlaps(&Rect::new(0, 50, 10, 10)));
        assert!(!a.overlaps(&Rect::new(-10, 0, 10, 10)));
        assert!(!a.overlaps(&Rect::new(0, -10, 10, 10)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Rect::new(570, 440, 60, 60);
        let b = Rect::new(600, 480, 50, 50);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_far_edges_saturate() {
        let r = Rect::new(i32::MAX - 10, i32::MAX, 60, 60);
        assert_eq!((r.right(), r.bottom()), (i32::MAX, i32::MAX));
        assert!(!r.overlaps(&Rect::new(0, 0, 60, 60)));
    }
}

//! Axis-aligned boxes shared by the layout engine and the overlap validator.

/// An axis-aligned box in top-down page coordinates (points).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the two boxes overlap with positive area. Boxes that merely
    /// share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(50.0, 25.0, 100.0, 50.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 60.0, 100.0, 50.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn shared_edge_is_not_an_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 50.0, 100.0, 50.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(100.0, 0.0, 50.0, 50.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn zero_area_box_never_intersects() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let empty = Rect::new(10.0, 10.0, 0.0, 0.0);
        assert!(!a.intersects(&empty));
    }
}

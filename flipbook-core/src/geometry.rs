/// A position in canvas pixels, origin at the top-left of the book.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of the window area available to the book.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning `x0..x1` horizontally; the bounds may be given in
    /// either order.
    pub fn from_x_span(x0: f32, x1: f32, height: f32) -> Self {
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        Self::new(lo, 0.0, hi - lo, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Horizontal intersection with `other`; `None` when they do not overlap.
    pub fn clip_x(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let x1 = self.right().min(other.right());
        (x1 > x0).then(|| Rect::new(x0, self.y, x1 - x0, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_order_independent() {
        assert_eq!(Rect::from_x_span(30.0, 10.0, 5.0), Rect::new(10.0, 0.0, 20.0, 5.0));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn clip_x_drops_disjoint_spans() {
        let page = Rect::new(100.0, 0.0, 100.0, 50.0);
        assert_eq!(
            Rect::new(150.0, 0.0, 100.0, 50.0).clip_x(&page),
            Some(Rect::new(150.0, 0.0, 50.0, 50.0))
        );
        assert_eq!(Rect::new(0.0, 0.0, 50.0, 50.0).clip_x(&page), None);
    }
}

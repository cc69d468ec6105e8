use flipbook_core::{Point, Rect};
use iced::{Rectangle, Size};

/// Zoom applied to the book surface when it is drawn. The engine never sees
/// it: layout and hit regions stay in unzoomed surface pixels.
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    const MIN_ZOOM: f32 = 0.5;
    const MAX_ZOOM: f32 = 2.0;
    const ZOOM_STEP: f32 = 0.25;
    const DEFAULT_ZOOM: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + Self::ZOOM_STEP).min(Self::MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - Self::ZOOM_STEP).max(Self::MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = Self::DEFAULT_ZOOM;
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < Self::MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > Self::MIN_ZOOM
    }

    /// Top-left of the zoomed surface, centred in `bounds`.
    pub fn origin(&self, bounds: Size, surface: Size) -> iced::Point {
        iced::Point::new(
            (bounds.width - surface.width * self.zoom) / 2.0,
            (bounds.height - surface.height * self.zoom) / 2.0,
        )
    }

    /// Map a position local to the canvas onto the book surface.
    pub fn to_surface(&self, local: iced::Point, bounds: Size, surface: Size) -> Point {
        let origin = self.origin(bounds, surface);
        Point::new((local.x - origin.x) / self.zoom, (local.y - origin.y) / self.zoom)
    }

    /// Map a surface rectangle into canvas coordinates.
    pub fn to_screen(&self, rect: Rect, bounds: Size, surface: Size) -> Rectangle {
        let origin = self.origin(bounds, surface);
        Rectangle {
            x: origin.x + rect.x * self.zoom,
            y: origin.y + rect.y * self.zoom,
            width: rect.width * self.zoom,
            height: rect.height * self.zoom,
        }
    }

    pub fn to_screen_x(&self, x: f32, bounds: Size, surface: Size) -> f32 {
        self.origin(bounds, surface).x + x * self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped_in_quarter_steps() {
        let mut viewport = Viewport::new();
        for _ in 0..10 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom(), 2.0);
        assert!(!viewport.can_zoom_in());

        for _ in 0..10 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom(), 0.5);

        viewport.zoom_in();
        assert_eq!(viewport.zoom(), 0.75);
        viewport.reset_zoom();
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn screen_and_surface_agree() {
        let mut viewport = Viewport::new();
        viewport.zoom_in();
        let bounds = Size::new(1000.0, 800.0);
        let surface = Size::new(400.0, 300.0);

        let screen = viewport.to_screen(Rect::new(40.0, 20.0, 10.0, 10.0), bounds, surface);
        assert_eq!(screen.x, 250.0 + 50.0);
        assert_eq!(screen.y, 212.5 + 25.0);

        let back = viewport.to_surface(iced::Point::new(screen.x, screen.y), bounds, surface);
        assert_eq!(back, Point::new(40.0, 20.0));
    }
}

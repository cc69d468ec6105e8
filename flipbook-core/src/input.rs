//! Pointer classification over the book surface.
//!
//! Coordinates are in book-surface pixels (see [`crate::render`]).

use crate::animation::Corner;
use crate::geometry::Point;
use crate::layout::LayoutState;
use crate::spread::Direction;
use crate::viewer::Command;

/// Square grab handle at each corner of the surface.
pub const DRAG_CORNER_SIZE: f32 = 80.0;
/// Clickable strip along each outer edge.
pub const FLIP_ZONE_WIDTH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Press starts a drag.
    Corner(Corner),
    /// Click turns the page.
    FlipZone(Direction),
}

/// Which active region, if any, lies under `point`. Corners win over zones.
pub fn classify(point: Point, layout: &LayoutState) -> Option<Region> {
    let width = layout.canvas_width();
    let height = layout.page_height;
    if point.x < 0.0 || point.y < 0.0 || point.x >= width || point.y >= height {
        return None;
    }

    let left = point.x < DRAG_CORNER_SIZE;
    let right = point.x >= width - DRAG_CORNER_SIZE;
    let top = point.y < DRAG_CORNER_SIZE;
    let bottom = point.y >= height - DRAG_CORNER_SIZE;

    let corner = match (left, right, top, bottom) {
        (true, _, true, _) => Some(Corner::TopLeft),
        (true, _, _, true) => Some(Corner::BottomLeft),
        (_, true, true, _) => Some(Corner::TopRight),
        (_, true, _, true) => Some(Corner::BottomRight),
        _ => None,
    };
    if let Some(corner) = corner {
        return Some(Region::Corner(corner));
    }

    if point.x < FLIP_ZONE_WIDTH {
        Some(Region::FlipZone(Direction::Prev))
    } else if point.x >= width - FLIP_ZONE_WIDTH {
        Some(Region::FlipZone(Direction::Next))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// The host lost the pointer (window blur, capture stolen).
    CaptureLost,
}

/// Tracks the pointer between press and release.
#[derive(Debug, Clone, Default)]
pub struct PointerAdapter {
    dragging: bool,
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Translate a pointer event into a command. The controller still decides
    /// whether a drag may start; call [`PointerAdapter::drag_refused`] when it
    /// refuses so moves stop being forwarded.
    pub fn translate(&mut self, event: PointerEvent, layout: &LayoutState) -> Option<Command> {
        match event {
            PointerEvent::Down(point) => match classify(point, layout) {
                Some(Region::Corner(corner)) => {
                    self.dragging = true;
                    Some(Command::DragStart { corner, point })
                }
                Some(Region::FlipZone(Direction::Next)) => Some(Command::Next),
                Some(Region::FlipZone(Direction::Prev)) => Some(Command::Prev),
                None => Some(Command::Activate(point)),
            },
            PointerEvent::Move(point) if self.dragging => Some(Command::DragMove(point)),
            PointerEvent::Move(_) => None,
            // Releasing and losing capture both end at the last move.
            PointerEvent::Up(_) | PointerEvent::CaptureLost if self.dragging => {
                self.dragging = false;
                Some(Command::DragEnd)
            }
            PointerEvent::Up(_) | PointerEvent::CaptureLost => None,
        }
    }

    pub fn drag_refused(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn double() -> LayoutState {
        LayoutState {
            is_landscape: false,
            page_width: 300.0,
            page_height: 400.0,
        }
    }

    fn single() -> LayoutState {
        LayoutState {
            is_landscape: true,
            page_width: 600.0,
            page_height: 400.0,
        }
    }

    #[test]
    fn corners_take_priority_over_zones() {
        let layout = double();
        assert_eq!(classify(Point::new(10.0, 10.0), &layout), Some(Region::Corner(Corner::TopLeft)));
        assert_eq!(classify(Point::new(590.0, 390.0), &layout), Some(Region::Corner(Corner::BottomRight)));
        assert_eq!(classify(Point::new(590.0, 200.0), &layout), Some(Region::FlipZone(Direction::Next)));
        assert_eq!(classify(Point::new(90.0, 200.0), &layout), Some(Region::FlipZone(Direction::Prev)));
        assert_eq!(classify(Point::new(300.0, 200.0), &layout), None);
        assert_eq!(classify(Point::new(700.0, 200.0), &layout), None);
    }

    #[test]
    fn single_mode_edges_map_to_directions() {
        let layout = single();
        let Some(Region::Corner(corner)) = classify(Point::new(5.0, 395.0), &layout) else {
            panic!("expected a corner");
        };
        assert_eq!(corner.direction(), Direction::Prev);
        let Some(Region::Corner(corner)) = classify(Point::new(595.0, 5.0), &layout) else {
            panic!("expected a corner");
        };
        assert_eq!(corner.direction(), Direction::Next);
    }

    #[test]
    fn drag_gesture_round_trip() {
        let layout = double();
        let mut adapter = PointerAdapter::new();

        assert_eq!(adapter.translate(PointerEvent::Move(Point::new(1.0, 1.0)), &layout), None);
        assert!(matches!(
            adapter.translate(PointerEvent::Down(Point::new(595.0, 395.0)), &layout),
            Some(Command::DragStart {
                corner: Corner::BottomRight,
                ..
            })
        ));
        assert_eq!(
            adapter.translate(PointerEvent::Move(Point::new(400.0, 390.0)), &layout),
            Some(Command::DragMove(Point::new(400.0, 390.0)))
        );
        assert_eq!(adapter.translate(PointerEvent::CaptureLost, &layout), Some(Command::DragEnd));
        assert!(!adapter.is_dragging());
        assert_eq!(adapter.translate(PointerEvent::Up(Point::new(0.0, 0.0)), &layout), None);
    }

    #[test]
    fn clicks_outside_regions_activate() {
        let mut adapter = PointerAdapter::new();
        let point = Point::new(300.0, 200.0);
        assert_eq!(
            adapter.translate(PointerEvent::Down(point), &double()),
            Some(Command::Activate(point))
        );
        assert_eq!(
            adapter.translate(PointerEvent::Down(Point::new(50.0, 200.0)), &double()),
            Some(Command::Prev)
        );
    }
}

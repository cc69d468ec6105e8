use crate::pages::PageHandles;
use crate::viewport::Viewport;
use flipbook_core::render::scaled_rect;
use flipbook_core::{DrawOp, PlacedHotspot, PointerEvent, Rgba};
use iced::mouse;
use iced::widget::canvas::{self, gradient, Frame, Geometry, Path, Stroke};
use iced::{Color, Rectangle, Renderer, Size, Theme, Vector};

use crate::Message;

/// Replays the engine's draw operations on an iced canvas and turns mouse
/// input into pointer events on the book surface.
pub struct BookCanvas<'a> {
    pub ops: Vec<DrawOp>,
    pub overlays: Vec<PlacedHotspot>,
    pub handles: &'a PageHandles,
    pub viewport: &'a Viewport,
    pub surface: Size,
    pub background: Color,
}

#[derive(Debug, Default)]
pub struct PointerState {
    pressed: bool,
}

impl canvas::Program<Message> for BookCanvas<'_> {
    type State = PointerState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let canvas::Event::Mouse(event) = event else {
            return (canvas::event::Status::Ignored, None);
        };
        // Positions relative to the canvas, even once the cursor has left it.
        let local = cursor
            .position()
            .map(|p| iced::Point::new(p.x - bounds.x, p.y - bounds.y));
        let to_surface = |p: iced::Point| self.viewport.to_surface(p, bounds.size(), self.surface);

        let pointer = match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let Some(point) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                state.pressed = true;
                PointerEvent::Down(to_surface(point))
            }
            mouse::Event::CursorMoved { .. } if state.pressed => match local {
                Some(point) => PointerEvent::Move(to_surface(point)),
                None => return (canvas::event::Status::Ignored, None),
            },
            mouse::Event::ButtonReleased(mouse::Button::Left) if state.pressed => {
                state.pressed = false;
                match local {
                    Some(point) => PointerEvent::Up(to_surface(point)),
                    None => PointerEvent::CaptureLost,
                }
            }
            mouse::Event::CursorLeft if state.pressed => {
                state.pressed = false;
                PointerEvent::CaptureLost
            }
            _ => return (canvas::event::Status::Ignored, None),
        };
        (canvas::event::Status::Captured, Some(Message::Pointer(pointer)))
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(iced::Point::ORIGIN, bounds.size(), self.background);
        self.replay(&mut frame, &self.ops, bounds.size());

        let outline = Stroke::default()
            .with_color(Color::from_rgba(0.2, 0.5, 1.0, 0.6))
            .with_width(1.5);
        for hotspot in &self.overlays {
            let rect = self.viewport.to_screen(hotspot.bounds, bounds.size(), self.surface);
            frame.stroke(&Path::rectangle(rect.position(), rect.size()), outline);
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: mouse::Cursor) -> mouse::Interaction {
        if state.pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

impl BookCanvas<'_> {
    /// Draw `ops` in order. A `Clip` applies until its matching `Unclip`.
    fn replay(&self, frame: &mut Frame, ops: &[DrawOp], bounds: Size) {
        let mut index = 0;
        while index < ops.len() {
            match &ops[index] {
                DrawOp::Clip(rect) => {
                    let end = matching_unclip(ops, index);
                    let region = self.viewport.to_screen(*rect, bounds, self.surface);
                    let inner = &ops[index + 1..end];
                    frame.with_clip(region, |clipped| {
                        // The clipped frame starts at the region's corner.
                        clipped.translate(Vector::new(-region.x, -region.y));
                        self.replay(clipped, inner, bounds);
                    });
                    index = end + 1;
                    continue;
                }
                DrawOp::Unclip => {}
                DrawOp::Clear(rect) => {
                    let rect = self.viewport.to_screen(*rect, bounds, self.surface);
                    frame.fill_rectangle(rect.position(), rect.size(), self.background);
                }
                DrawOp::Blit {
                    page,
                    dest,
                    scale_x,
                    anchor_x,
                } => {
                    let rect = self
                        .viewport
                        .to_screen(scaled_rect(*dest, *scale_x, *anchor_x), bounds, self.surface);
                    match self.handles.get(*page) {
                        Some(handle) => frame.draw_image(rect, canvas::Image::new(handle.clone())),
                        None => frame.fill_rectangle(rect.position(), rect.size(), Color::WHITE),
                    }
                }
                DrawOp::FillRect { rect, color } => {
                    let rect = self.viewport.to_screen(*rect, bounds, self.surface);
                    frame.fill_rectangle(rect.position(), rect.size(), to_color(*color));
                }
                DrawOp::LinearGradient { rect, x0, x1, stops } => {
                    let rect = self.viewport.to_screen(*rect, bounds, self.surface);
                    let y = rect.y + rect.height / 2.0;
                    let start = iced::Point::new(self.viewport.to_screen_x(*x0, bounds, self.surface), y);
                    let end = iced::Point::new(self.viewport.to_screen_x(*x1, bounds, self.surface), y);
                    let fill = stops
                        .iter()
                        .fold(gradient::Linear::new(start, end), |linear, stop| {
                            linear.add_stop(stop.offset.clamp(0.0, 1.0), to_color(stop.color))
                        });
                    frame.fill_rectangle(rect.position(), rect.size(), fill);
                }
            }
            index += 1;
        }
    }
}

/// Index of the `Unclip` closing the `Clip` at `start`, or the end of `ops`.
fn matching_unclip(ops: &[DrawOp], start: usize) -> usize {
    let mut depth = 0usize;
    for (index, op) in ops.iter().enumerate().skip(start) {
        match op {
            DrawOp::Clip(_) => depth += 1,
            DrawOp::Unclip => {
                depth -= 1;
                if depth == 0 {
                    return index;
                }
            }
            _ => {}
        }
    }
    ops.len()
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipbook_core::Rect;

    #[test]
    fn nested_clips_pair_up() {
        let ops = vec![
            DrawOp::Clip(Rect::default()),
            DrawOp::Clip(Rect::default()),
            DrawOp::Unclip,
            DrawOp::Unclip,
            DrawOp::Clip(Rect::default()),
        ];
        assert_eq!(matching_unclip(&ops, 0), 3);
        assert_eq!(matching_unclip(&ops, 1), 2);
        assert_eq!(matching_unclip(&ops, 4), ops.len());
    }
}

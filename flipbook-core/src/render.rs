//! Fold rendering as an ordered list of 2D draw operations.
//!
//! The book surface is `page_width` wide in single mode and `2 * page_width`
//! in double mode, `page_height` tall, origin at the top-left. Pages turn
//! about a hinge: the spine in double mode, the binding edge of the single
//! page otherwise (left edge when going forward, right edge going back).
//! Any surface that can clip, blit a scaled image and fill gradients can
//! replay the output.

use std::f32::consts::PI;

use crate::animation::TurnView;
use crate::cache::PageCache;
use crate::geometry::Rect;
use crate::layout::LayoutState;
use crate::spread::{Direction, Spread, TurnPlan};

/// Smallest horizontal scale ever emitted; zero-width blits upset backends.
pub const MIN_SCALE: f32 = 0.01;
/// Drag previews below this progress show the resting spread.
const MIN_PREVIEW_PROGRESS: f32 = 0.02;
const FACE_SHADOW_WIDTH: f32 = 50.0;
const FACE_SHADOW_ALPHA: f32 = 0.3;
const UNDERLAY_SHADOW_ALPHA: f32 = 0.4;
const SINGLE_SHADOW_ALPHA: f32 = 0.5;
/// Overhang of the cast shadow beyond the turning sheet.
const SHADOW_OVERHANG: f32 = 20.0;
const SPINE_SHADOW_WIDTH: f32 = 40.0;
const SPINE_SHADOW_ALPHA: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::shadow(0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Black at the given opacity.
    pub const fn shadow(alpha: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Erase the whole surface.
    Clear(Rect),
    /// Restrict subsequent operations to `rect` until the matching `Unclip`.
    Clip(Rect),
    Unclip,
    /// Draw `page` into `dest`, then scale horizontally by `scale_x` about
    /// the vertical line `x = anchor_x`.
    Blit {
        page: u32,
        dest: Rect,
        scale_x: f32,
        anchor_x: f32,
    },
    FillRect { rect: Rect, color: Rgba },
    /// Fill `rect` with a horizontal gradient running from `x0` to `x1`.
    LinearGradient {
        rect: Rect,
        x0: f32,
        x1: f32,
        stops: Vec<GradientStop>,
    },
}

/// Where `rect` lands after scaling by `scale_x` about `anchor_x`.
pub fn scaled_rect(rect: Rect, scale_x: f32, anchor_x: f32) -> Rect {
    let x0 = anchor_x + (rect.x - anchor_x) * scale_x;
    let x1 = anchor_x + (rect.right() - anchor_x) * scale_x;
    Rect::new(x0.min(x1), rect.y, (x1 - x0).abs(), rect.height)
}

/// Darkened part of the destination page in a single-page turn. While the
/// face is folding the shade starts just under its free edge and runs to the
/// far side of the page; once the face is gone it shrinks back toward the
/// hinge over `w * (1 - p)` plus the overhang.
fn single_shade(face: Rect, p: f32, w: f32, h: f32, direction: Direction) -> Rect {
    let extent = w * (1.0 - p) + SHADOW_OVERHANG;
    match (direction, p < 0.5) {
        (Direction::Next, true) => Rect::from_x_span(face.right() - SHADOW_OVERHANG, w, h),
        (Direction::Prev, true) => Rect::from_x_span(0.0, face.x + SHADOW_OVERHANG, h),
        (Direction::Next, false) => Rect::from_x_span(0.0, extent, h),
        (Direction::Prev, false) => Rect::from_x_span(w - extent, w, h),
    }
}

/// Turns a controller view into draw operations.
#[derive(Debug, Clone, Copy)]
pub struct FoldRenderer<'a> {
    layout: LayoutState,
    total_pages: u32,
    pages: &'a PageCache,
}

impl<'a> FoldRenderer<'a> {
    pub fn new(layout: LayoutState, total_pages: u32, pages: &'a PageCache) -> Self {
        Self {
            layout,
            total_pages,
            pages,
        }
    }

    pub fn frame(&self, view: TurnView, spread: Spread) -> Vec<DrawOp> {
        match view {
            TurnView::Settled => self.settled(spread),
            TurnView::Dragging { plan, drag_progress } => self.drag_preview(plan, drag_progress, spread),
            TurnView::Turning { plan, progress } => self.turn(plan, progress, spread),
        }
    }

    /// The resting spread.
    pub fn settled(&self, spread: Spread) -> Vec<DrawOp> {
        let mut ops = vec![DrawOp::Clear(self.surface())];
        let w = self.layout.page_width;
        if let Some(left) = spread.left {
            self.push_page(&mut ops, left, self.half(0.0), 1.0, 0.0);
        }
        if self.layout.is_double() {
            if let Some(right) = spread.right {
                self.push_page(&mut ops, right, self.half(w), 1.0, w);
            }
            self.push_spine_shadow(&mut ops);
        }
        ops
    }

    /// A single page filling the surface, used by slide modes.
    pub fn slide(&self, page: u32) -> Vec<DrawOp> {
        let dest = self.half(0.0);
        let mut ops = vec![DrawOp::Clear(dest)];
        self.push_page(&mut ops, page, dest, 1.0, 0.0);
        ops
    }

    /// Live feedback while dragging: the fold at half the drag distance.
    pub fn drag_preview(&self, plan: TurnPlan, drag_progress: f32, spread: Spread) -> Vec<DrawOp> {
        if drag_progress < MIN_PREVIEW_PROGRESS {
            return self.settled(spread);
        }
        self.turn(plan, drag_progress * 0.5, spread)
    }

    /// One frame of a turn at `progress` in `[0, 1]`.
    pub fn turn(&self, plan: TurnPlan, progress: f32, spread: Spread) -> Vec<DrawOp> {
        let progress = progress.clamp(0.0, 1.0);
        if self.layout.is_double() {
            self.double_turn(plan, progress, spread)
        } else {
            self.single_turn(plan, progress)
        }
    }

    fn double_turn(&self, plan: TurnPlan, p: f32, spread: Spread) -> Vec<DrawOp> {
        let w = self.layout.page_width;
        let h = self.layout.page_height;
        let spine = w;
        let left_half = self.half(0.0);
        let right_half = self.half(w);
        let (turning_half, facing_half) = match plan.direction {
            Direction::Next => (right_half, left_half),
            Direction::Prev => (left_half, right_half),
        };
        let mut ops = vec![DrawOp::Clear(self.surface())];

        // The half that is not turning stays put until the back face covers it.
        let resting = match plan.direction {
            Direction::Next => spread.left,
            Direction::Prev => spread.right,
        };
        if let Some(page) = resting {
            self.push_page(&mut ops, page, facing_half, 1.0, facing_half.x);
        }

        if let Some(under) = plan.under {
            ops.push(DrawOp::Clip(turning_half));
            self.push_page(&mut ops, under, turning_half, 1.0, turning_half.x);
            // Darken what the sheet still covers.
            let covered = w * (1.0 - p) + SHADOW_OVERHANG;
            let shade = match plan.direction {
                Direction::Next => Rect::from_x_span(spine, spine + covered, h),
                Direction::Prev => Rect::from_x_span(spine - covered, spine, h),
            };
            if let Some(rect) = shade.clip_x(&turning_half) {
                ops.push(DrawOp::FillRect {
                    rect,
                    color: Rgba::shadow((p * PI).sin() * UNDERLAY_SHADOW_ALPHA),
                });
            }
            ops.push(DrawOp::Unclip);
        }

        if p < 0.5 {
            let scale = (1.0 - 2.0 * p).max(MIN_SCALE);
            ops.push(DrawOp::Clip(turning_half));
            self.push_page(&mut ops, plan.turning, turning_half, scale, spine);
            let face = scaled_rect(turning_half, scale, spine);
            self.push_face_shadow(&mut ops, face, plan.direction, FACE_SHADOW_ALPHA * (1.0 - 2.0 * p), true);
            ops.push(DrawOp::Unclip);
        } else {
            let scale = (2.0 * (p - 0.5)).max(MIN_SCALE);
            ops.push(DrawOp::Clip(facing_half));
            self.push_page(&mut ops, plan.destination, facing_half, scale, spine);
            let face = scaled_rect(facing_half, scale, spine);
            self.push_face_shadow(&mut ops, face, plan.direction, FACE_SHADOW_ALPHA * 2.0 * (p - 0.5), false);
            ops.push(DrawOp::Unclip);
        }

        self.push_spine_shadow(&mut ops);
        ops
    }

    fn single_turn(&self, plan: TurnPlan, p: f32) -> Vec<DrawOp> {
        let w = self.layout.page_width;
        let h = self.layout.page_height;
        let page = self.half(0.0);
        let hinge = match plan.direction {
            Direction::Next => 0.0,
            Direction::Prev => w,
        };
        let scale = (1.0 - 2.0 * p).max(MIN_SCALE);
        let face = scaled_rect(page, scale, hinge);
        let mut ops = vec![DrawOp::Clear(self.surface())];

        self.push_page(&mut ops, plan.destination, page, 1.0, hinge);
        if let Some(rect) = single_shade(face, p, w, h, plan.direction).clip_x(&page) {
            ops.push(DrawOp::FillRect {
                rect,
                color: Rgba::shadow((p * PI).sin() * SINGLE_SHADOW_ALPHA),
            });
        }

        if p < 0.5 {
            ops.push(DrawOp::Clip(page));
            self.push_page(&mut ops, plan.turning, page, scale, hinge);
            self.push_face_shadow(&mut ops, face, plan.direction, FACE_SHADOW_ALPHA * (1.0 - 2.0 * p), true);
            ops.push(DrawOp::Unclip);
        }
        ops
    }

    /// Shade the free edge of a folding face. `front` selects the front face
    /// (collapsing) rather than the back face (unfolding on the other half).
    fn push_face_shadow(&self, ops: &mut Vec<DrawOp>, face: Rect, direction: Direction, alpha: f32, front: bool) {
        if face.width <= 0.0 || alpha <= 0.0 {
            return;
        }
        // Free edge is on the right of the face when the hinge is on its left.
        let free_edge_right = matches!(
            (direction, front),
            (Direction::Next, true) | (Direction::Prev, false)
        );
        let width = FACE_SHADOW_WIDTH.min(face.width);
        let (x0, x1, rect) = if free_edge_right {
            let edge = face.right();
            (edge - width, edge, Rect::new(edge - width, 0.0, width, face.height))
        } else {
            let edge = face.x;
            (edge + width, edge, Rect::new(edge, 0.0, width, face.height))
        };
        ops.push(DrawOp::LinearGradient {
            rect,
            x0,
            x1,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Rgba::TRANSPARENT,
                },
                GradientStop {
                    offset: 1.0,
                    color: Rgba::shadow(alpha),
                },
            ],
        });
    }

    fn push_spine_shadow(&self, ops: &mut Vec<DrawOp>) {
        let spine = self.layout.page_width;
        let half = SPINE_SHADOW_WIDTH / 2.0;
        ops.push(DrawOp::LinearGradient {
            rect: Rect::new(spine - half, 0.0, SPINE_SHADOW_WIDTH, self.layout.page_height),
            x0: spine - half,
            x1: spine + half,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Rgba::TRANSPARENT,
                },
                GradientStop {
                    offset: 0.5,
                    color: Rgba::shadow(SPINE_SHADOW_ALPHA),
                },
                GradientStop {
                    offset: 1.0,
                    color: Rgba::TRANSPARENT,
                },
            ],
        });
    }

    /// Pages beyond the document are skipped; pages that failed to load
    /// are drawn blank.
    fn push_page(&self, ops: &mut Vec<DrawOp>, page: u32, dest: Rect, scale_x: f32, anchor_x: f32) {
        if page == 0 || page > self.total_pages {
            return;
        }
        if self.pages.is_available(page) {
            ops.push(DrawOp::Blit {
                page,
                dest,
                scale_x,
                anchor_x,
            });
        } else {
            ops.push(DrawOp::FillRect {
                rect: scaled_rect(dest, scale_x, anchor_x),
                color: Rgba::WHITE,
            });
        }
    }

    fn half(&self, x: f32) -> Rect {
        Rect::new(x, 0.0, self.layout.page_width, self.layout.page_height)
    }

    fn surface(&self) -> Rect {
        Rect::new(0.0, 0.0, self.layout.canvas_width(), self.layout.page_height)
    }
}

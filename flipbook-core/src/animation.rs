//! Page-turn state machine.
//!
//! ```text
//!            next()/prev()                  progress == 1
//!   Idle ───────────────────► Animating ─────────────────► Idle (page settled)
//!    │                            ▲
//!    │ drag_start()               │ release, drag > threshold
//!    ▼                            │
//!  Dragging ──────────────────────┤
//!                                 │ release, drag <= threshold
//!                                 ▼
//!                            Cancelling ─────────────────► Idle (page unchanged)
//! ```
//!
//! The controller is the only writer of the current page, the layout and the
//! active session. It is clocked by [`AnimationController::tick`] while a
//! session runs; drags are driven by pointer moves instead.

use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::geometry::{Point, Size};
use crate::layout::{LayoutState, PageFormat, ResizeDebouncer};
use crate::spread::{self, Direction, Spread, TurnPlan};

/// Cubic ease-in-out, mapping `[0, 1]` onto `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// What started a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Auto,
    Drag,
}

/// Grab handle a drag starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Left-side corners turn back, right-side corners turn forward.
    pub fn direction(self) -> Direction {
        match self {
            Corner::TopLeft | Corner::BottomLeft => Direction::Prev,
            Corner::TopRight | Corner::BottomRight => Direction::Next,
        }
    }
}

/// A running automatic, committing or cancelling turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSession {
    pub plan: TurnPlan,
    pub origin: Origin,
    pub progress: f32,
    start_progress: f32,
    started_at: Instant,
    duration: Duration,
}

impl AnimationSession {
    fn new(plan: TurnPlan, origin: Origin, start_progress: f32, started_at: Instant, duration: Duration) -> Self {
        Self {
            plan,
            origin,
            progress: start_progress,
            start_progress,
            started_at,
            duration,
        }
    }

    pub fn direction(&self) -> Direction {
        self.plan.direction
    }

    /// Fraction of the session's duration elapsed at `now`, in `[0, 1]`.
    fn elapsed_fraction(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// A pointer gesture in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub corner: Corner,
    pub direction: Direction,
    pub start_pointer: Point,
    /// Pointer displacement relative to the page width, in `[0, 1]`.
    pub progress: f32,
    pub plan: TurnPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    Idle,
    Animating(AnimationSession),
    Dragging(DragSession),
    Cancelling(AnimationSession),
}

/// Notifications for the façade, drained after each command.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A turn was committed; fired once per turn, when it starts animating.
    TurnStarted { direction: Direction, origin: Origin },
    /// A turn completed and the current page moved.
    PageSettled { page: u32 },
    /// A drag was released below the commit threshold and has rolled back.
    TurnCancelled,
    /// The page size changed after a resize.
    LayoutChanged(LayoutState),
}

/// What the renderer should draw for the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnView {
    Settled,
    Dragging { plan: TurnPlan, drag_progress: f32 },
    Turning { plan: TurnPlan, progress: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub turn: Duration,
    pub commit: Duration,
    pub cancel: Duration,
    pub commit_threshold: f32,
    pub resize_debounce: Duration,
    pub landscape_ratio: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for Timings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            turn: config.turn_duration(),
            commit: config.commit_duration(),
            cancel: config.cancel_duration(),
            commit_threshold: config.commit_threshold,
            resize_debounce: config.resize_debounce(),
            landscape_ratio: config.landscape_ratio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationController {
    total_pages: u32,
    format: PageFormat,
    current_page: u32,
    layout: LayoutState,
    state: TurnState,
    resize: ResizeDebouncer,
    timings: Timings,
    events: Vec<ControllerEvent>,
}

impl AnimationController {
    pub fn new(total_pages: u32, format: PageFormat, viewport: Size, start_page: u32, timings: Timings) -> Self {
        let layout = LayoutState::compute(&format, viewport, timings.landscape_ratio);
        let current_page = spread::clamp_target(i64::from(start_page), total_pages, layout.is_landscape);
        tracing::debug!(
            "Controller ready: {} pages, {} mode, {}x{} px pages, starting at {}",
            total_pages,
            if layout.is_landscape { "single" } else { "double" },
            layout.page_width,
            layout.page_height,
            current_page
        );
        Self {
            total_pages,
            format,
            current_page,
            layout,
            state: TurnState::Idle,
            resize: ResizeDebouncer::new(timings.resize_debounce),
            timings,
            events: Vec::new(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TurnState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, TurnState::Dragging(_))
    }

    pub fn spread(&self) -> Spread {
        spread::spread_of(self.current_page, self.layout.is_landscape, self.total_pages)
    }

    /// Whether the host should keep delivering frame ticks.
    pub fn needs_frames(&self) -> bool {
        matches!(self.state, TurnState::Animating(_) | TurnState::Cancelling(_)) || self.resize.is_pending()
    }

    /// Fold progress currently on screen; 0 when nothing is turning.
    pub fn display_progress(&self) -> f32 {
        match &self.state {
            TurnState::Idle => 0.0,
            TurnState::Dragging(drag) => drag.progress * 0.5,
            TurnState::Animating(session) | TurnState::Cancelling(session) => session.progress,
        }
    }

    pub fn view(&self) -> TurnView {
        match &self.state {
            TurnState::Idle => TurnView::Settled,
            TurnState::Dragging(drag) => TurnView::Dragging {
                plan: drag.plan,
                drag_progress: drag.progress,
            },
            TurnState::Animating(session) | TurnState::Cancelling(session) => TurnView::Turning {
                plan: session.plan,
                progress: session.progress,
            },
        }
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.start_turn(Direction::Next, now)
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        self.start_turn(Direction::Prev, now)
    }

    fn start_turn(&mut self, direction: Direction, now: Instant) -> bool {
        if !self.is_idle() {
            tracing::debug!("Ignoring {:?} request, a turn is already in progress", direction);
            return false;
        }
        let Some(plan) = self.plan(direction) else {
            return false;
        };
        self.begin_animation(AnimationSession::new(plan, Origin::Auto, 0.0, now, self.timings.turn));
        true
    }

    /// Jump straight to `page` without animating. Ignored mid-turn.
    pub fn go_to(&mut self, page: i64) -> bool {
        if !self.is_idle() {
            return false;
        }
        let target = spread::clamp_target(page, self.total_pages, self.layout.is_landscape);
        if target == self.current_page {
            return false;
        }
        self.current_page = target;
        self.events.push(ControllerEvent::PageSettled { page: target });
        true
    }

    /// Begin a drag from `corner`. Refused while a turn runs or when the
    /// corner's direction leads nowhere.
    pub fn drag_start(&mut self, corner: Corner, pointer: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        let direction = corner.direction();
        let Some(plan) = self.plan(direction) else {
            return false;
        };
        tracing::debug!("Drag started from {:?}", corner);
        self.state = TurnState::Dragging(DragSession {
            corner,
            direction,
            start_pointer: pointer,
            progress: 0.0,
            plan,
        });
        true
    }

    pub fn drag_move(&mut self, pointer: Point) {
        let page_width = self.layout.page_width.max(1.0);
        if let TurnState::Dragging(drag) = &mut self.state {
            let delta = pointer.x - drag.start_pointer.x;
            let travelled = match drag.direction {
                Direction::Next => -delta,
                Direction::Prev => delta,
            };
            drag.progress = (travelled / page_width).clamp(0.0, 1.0);
        }
    }

    /// Release the drag: commit above the threshold, roll back otherwise.
    /// Losing pointer capture goes through here as well.
    pub fn drag_end(&mut self, now: Instant) {
        let TurnState::Dragging(drag) = &self.state else {
            return;
        };
        let plan = drag.plan;
        let drag_progress = drag.progress;
        let start = drag_progress * 0.5;

        if drag_progress > self.timings.commit_threshold {
            tracing::debug!("Drag released at {:.2}, committing", drag_progress);
            let duration = self.timings.commit.mul_f32(1.0 - start);
            self.begin_animation(AnimationSession::new(plan, Origin::Drag, start, now, duration));
        } else if start <= 0.0 {
            self.state = TurnState::Idle;
            self.events.push(ControllerEvent::TurnCancelled);
            self.apply_pending_resize(now);
        } else {
            tracing::debug!("Drag released at {:.2}, cancelling", drag_progress);
            let duration = self.timings.cancel.mul_f32(start);
            self.state = TurnState::Cancelling(AnimationSession::new(plan, Origin::Drag, start, now, duration));
        }
    }

    /// Queue a viewport change. It is applied once the debounce delay has
    /// passed and no turn is in progress.
    pub fn resize(&mut self, viewport: Size, now: Instant) {
        self.resize.push(viewport, now);
    }

    /// Advance the running session to `now`.
    pub fn tick(&mut self, now: Instant) {
        match &mut self.state {
            TurnState::Idle | TurnState::Dragging(_) => {}
            TurnState::Animating(session) => {
                let t = session.elapsed_fraction(now);
                session.progress = match session.origin {
                    Origin::Auto => ease_in_out_cubic(t),
                    Origin::Drag => session.start_progress + (1.0 - session.start_progress) * t,
                };
                if t >= 1.0 {
                    session.progress = 1.0;
                    let direction = session.direction();
                    self.finish_turn(direction);
                }
            }
            TurnState::Cancelling(session) => {
                let t = session.elapsed_fraction(now);
                session.progress = session.start_progress * (1.0 - ease_in_out_cubic(t));
                if t >= 1.0 {
                    session.progress = 0.0;
                    self.state = TurnState::Idle;
                    self.events.push(ControllerEvent::TurnCancelled);
                }
            }
        }
        self.apply_pending_resize(now);
    }

    fn plan(&self, direction: Direction) -> Option<TurnPlan> {
        spread::plan_turn(direction, self.current_page, self.layout.is_landscape, self.total_pages)
    }

    fn begin_animation(&mut self, session: AnimationSession) {
        self.events.push(ControllerEvent::TurnStarted {
            direction: session.direction(),
            origin: session.origin,
        });
        self.state = TurnState::Animating(session);
    }

    fn finish_turn(&mut self, direction: Direction) {
        self.current_page = spread::settle(self.current_page, direction, self.layout.is_landscape, self.total_pages);
        self.state = TurnState::Idle;
        tracing::debug!("Turn finished on page {}", self.current_page);
        self.events.push(ControllerEvent::PageSettled {
            page: self.current_page,
        });
    }

    fn apply_pending_resize(&mut self, now: Instant) {
        if !self.is_idle() {
            return;
        }
        if let Some(viewport) = self.resize.poll(now) {
            let layout = LayoutState::compute(&self.format, viewport, self.timings.landscape_ratio);
            if layout != self.layout {
                tracing::debug!("Relayout to {}x{} px pages", layout.page_width, layout.page_height);
                self.layout = layout;
                self.events.push(ControllerEvent::LayoutChanged(layout));
            }
        }
    }
}

use std::time::{Duration, Instant};

use flipbook_core::spread::{plan_turn, spread_of};
use flipbook_core::{
    ease_in_out_cubic, AnimationController, AudioFeedback, Command, Corner, Direction, EngineConfig, PageCache,
    PageFormat, PageImage, Point, Size, Timings, ViewMode, Viewer, ViewerOptions,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const PORTRAIT: PageFormat = PageFormat {
    width: 800,
    height: 1000,
    ratio: 0.8,
};

const LANDSCAPE: PageFormat = PageFormat {
    width: 1600,
    height: 1000,
    ratio: 1.6,
};

fn controller(total: u32, format: PageFormat) -> AnimationController {
    AnimationController::new(total, format, Size::new(1060.0, 1060.0), 1, Timings::default())
}

fn finish_auto_turn(controller: &mut AnimationController, now: &mut Instant) {
    *now += Duration::from_millis(700);
    controller.tick(*now);
    assert!(controller.is_idle());
}

proptest! {
    #[test]
    fn double_spreads_start_on_odd_pages(total in 1u32..200, current in 1u32..200) {
        let current = current.min(total);
        let spread = spread_of(current, false, total);
        prop_assert_eq!(spread, spread_of(current, false, total));

        let left = spread.left.unwrap();
        prop_assert_eq!(left % 2, 1);
        prop_assert_eq!(spread.right.is_some(), left + 1 <= total);
        if let Some(right) = spread.right {
            prop_assert_eq!(right, left + 1);
        }
    }

    #[test]
    fn single_spreads_have_no_right_page(total in 1u32..200, current in 1u32..200) {
        let current = current.min(total);
        let spread = spread_of(current, true, total);
        prop_assert_eq!(spread.left, Some(current));
        prop_assert_eq!(spread.right, None);
    }

    #[test]
    fn easing_is_monotone(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ease_in_out_cubic(lo) <= ease_in_out_cubic(hi) + 1e-6);
        prop_assert!((0.0..=1.0).contains(&ease_in_out_cubic(a)));
    }

    #[test]
    fn under_page_only_exists_when_in_range(total in 1u32..60, current in 1u32..60, next in any::<bool>()) {
        let current = current.min(total);
        let direction = if next { Direction::Next } else { Direction::Prev };
        if let Some(plan) = plan_turn(direction, current, false, total) {
            if let Some(under) = plan.under {
                prop_assert!((1..=total).contains(&under));
            }
            prop_assert!((1..=total).contains(&plan.destination));
        }
    }
}

#[test]
fn three_turns_walk_the_spreads() {
    let mut controller = controller(10, PORTRAIT);
    let mut now = Instant::now();
    let mut seen = vec![controller.current_page()];

    for _ in 0..3 {
        assert!(controller.next(now));
        finish_auto_turn(&mut controller, &mut now);
        seen.push(controller.current_page());
    }
    assert_eq!(seen, vec![1, 3, 5, 7]);
}

#[test]
fn single_page_landscape_document_cannot_turn() {
    let mut controller = controller(1, LANDSCAPE);
    let now = Instant::now();
    assert!(controller.layout().is_landscape);
    assert!(!controller.next(now));
    assert!(!controller.prev(now));
    assert!(!controller.drag_start(Corner::TopRight, Point::new(10.0, 10.0)));
    assert_eq!(controller.spread().right, None);
    assert_eq!(controller.current_page(), 1);
}

fn drag_and_release(controller: &mut AnimationController, fraction: f32, now: Instant) {
    let width = controller.layout().page_width;
    let start = Point::new(controller.layout().canvas_width() - 1.0, 50.0);
    assert!(controller.drag_start(Corner::TopRight, start));
    controller.drag_move(Point::new(start.x - width * fraction, 50.0));
    controller.drag_end(now);
}

#[test]
fn release_past_threshold_commits() {
    let mut controller = controller(10, PORTRAIT);
    let now = Instant::now();
    drag_and_release(&mut controller, 0.35, now);
    assert!(!controller.is_idle());

    controller.tick(now + Duration::from_millis(500));
    assert!(controller.is_idle());
    assert_eq!(controller.current_page(), 3);
}

#[test]
fn release_before_threshold_cancels() {
    let mut controller = controller(10, PORTRAIT);
    let now = Instant::now();
    drag_and_release(&mut controller, 0.25, now);
    assert!(controller.display_progress() > 0.0);

    controller.tick(now + Duration::from_millis(200));
    assert!(controller.is_idle());
    assert_eq!(controller.display_progress(), 0.0);
    assert_eq!(controller.current_page(), 1);
}

#[test]
fn mode_round_trip_returns_to_the_same_page() {
    let pages = PageCache::from_pages((0..10).map(|_| Some(PageImage::blank(800, 1000))).collect());
    let options =
        ViewerOptions::new(EngineConfig::default(), Size::new(1060.0, 1060.0)).with_mode(ViewMode::Magazine);
    let mut viewer = Viewer::new(pages, AudioFeedback::silent(), options);

    viewer.dispatch(Command::GoTo(5));
    assert_eq!(viewer.current_page(), 5);
    viewer.dispatch(Command::SetMode("coverflow".into()));
    assert_eq!(viewer.current_page(), 5);
    viewer.dispatch(Command::SetMode("magazine".into()));
    assert_eq!(viewer.current_page(), 5);
    assert_eq!(viewer.controller().spread().left, Some(5));
}

//! Interactive regions laid over settled pages.

use serde::Deserialize;

use crate::animation::TurnView;
use crate::geometry::{Point, Rect};
use crate::layout::LayoutState;
use crate::spread::{Direction, Spread};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotspotKind {
    #[serde(alias = "url")]
    Link,
    #[serde(alias = "page")]
    PageJump,
}

/// A hotspot as authored, positioned in percent of the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hotspot {
    pub page: u32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default = "default_extent")]
    pub width: f32,
    #[serde(default = "default_extent")]
    pub height: f32,
    #[serde(rename = "type", alias = "kind")]
    pub kind: HotspotKind,
    /// URL for links, page number (as text or number) for jumps.
    #[serde(default, deserialize_with = "target_as_string")]
    pub target: String,
    #[serde(default)]
    pub label: String,
}

fn default_extent() -> f32 {
    10.0
}

fn target_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// What activating a hotspot asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotspotAction {
    OpenLink(String),
    GoTo(u32),
}

impl Hotspot {
    pub fn action(&self) -> Option<HotspotAction> {
        match self.kind {
            HotspotKind::Link if !self.target.is_empty() => Some(HotspotAction::OpenLink(self.target.clone())),
            HotspotKind::Link => None,
            HotspotKind::PageJump => self.target.trim().parse().ok().map(HotspotAction::GoTo),
        }
    }
}

/// A hotspot resolved to canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedHotspot {
    pub bounds: Rect,
    pub label: String,
    pub action: HotspotAction,
}

/// Resolve the hotspots of every page that is at rest. Pages that are
/// turning, or about to be covered by the back of the sheet, carry none.
pub fn place_overlays(hotspots: &[Hotspot], spread: Spread, layout: &LayoutState, view: TurnView) -> Vec<PlacedHotspot> {
    let w = layout.page_width;
    let mut settled: Vec<(u32, f32)> = Vec::with_capacity(2);
    let resting_left = spread.left.map(|page| (page, 0.0));
    let resting_right = spread.right.filter(|_| layout.is_double()).map(|page| (page, w));

    match view {
        TurnView::Settled => settled.extend(resting_left.into_iter().chain(resting_right)),
        // Drag previews never pass the first half of the fold.
        TurnView::Dragging { plan, .. } if layout.is_double() => {
            settled.extend(resting_half(plan.direction, resting_left, resting_right));
        }
        TurnView::Turning { plan, progress } if layout.is_double() && progress < 0.5 => {
            settled.extend(resting_half(plan.direction, resting_left, resting_right));
        }
        _ => {}
    }

    settled
        .into_iter()
        .flat_map(|(page, offset_x)| {
            hotspots.iter().filter(move |h| h.page == page).filter_map(move |hotspot| {
                let action = hotspot.action()?;
                Some(PlacedHotspot {
                    bounds: Rect::new(
                        offset_x + hotspot.x / 100.0 * w,
                        hotspot.y / 100.0 * layout.page_height,
                        hotspot.width / 100.0 * w,
                        hotspot.height / 100.0 * layout.page_height,
                    ),
                    label: hotspot.label.clone(),
                    action,
                })
            })
        })
        .collect()
}

fn resting_half(direction: Direction, left: Option<(u32, f32)>, right: Option<(u32, f32)>) -> Option<(u32, f32)> {
    match direction {
        Direction::Next => left,
        Direction::Prev => right,
    }
}

/// Topmost hotspot under `point`.
pub fn hit_test(placed: &[PlacedHotspot], point: Point) -> Option<&HotspotAction> {
    placed
        .iter()
        .rev()
        .find(|hotspot| hotspot.bounds.contains(point))
        .map(|hotspot| &hotspot.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::{plan_turn, spread_of};
    use pretty_assertions::assert_eq;

    fn layout(is_landscape: bool) -> LayoutState {
        LayoutState {
            is_landscape,
            page_width: 200.0,
            page_height: 400.0,
        }
    }

    fn hotspots() -> Vec<Hotspot> {
        serde_json::from_str(
            r#"[
                { "page": 1, "x": 10, "y": 10, "width": 50, "height": 25, "type": "url",
                  "target": "https://example.com", "label": "Site" },
                { "page": 2, "x": 0, "y": 0, "type": "page", "target": 7, "label": "Jump" },
                { "page": 3, "type": "page-jump", "target": "nowhere" }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn deserializes_authoring_format() {
        let hotspots = hotspots();
        assert_eq!(hotspots[0].kind, HotspotKind::Link);
        assert_eq!(hotspots[1].kind, HotspotKind::PageJump);
        assert_eq!(hotspots[1].width, 10.0);
        assert_eq!(hotspots[1].action(), Some(HotspotAction::GoTo(7)));
        assert_eq!(hotspots[2].action(), None);
    }

    #[test]
    fn settled_spread_places_both_pages() {
        let placed = place_overlays(&hotspots(), spread_of(1, false, 4), &layout(false), TurnView::Settled);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].bounds, Rect::new(20.0, 40.0, 100.0, 100.0));
        // Right page is offset by one page width.
        assert_eq!(placed[1].bounds.x, 200.0);
        assert_eq!(
            hit_test(&placed, Point::new(210.0, 5.0)),
            Some(&HotspotAction::GoTo(7))
        );
        assert_eq!(hit_test(&placed, Point::new(150.0, 300.0)), None);
    }

    #[test]
    fn turning_pages_carry_no_overlays() {
        let spread = spread_of(1, false, 4);
        let plan = plan_turn(Direction::Next, 1, false, 4).unwrap();

        let early = place_overlays(&hotspots(), spread, &layout(false), TurnView::Turning { plan, progress: 0.2 });
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].label, "Site");

        let late = place_overlays(&hotspots(), spread, &layout(false), TurnView::Turning { plan, progress: 0.7 });
        assert!(late.is_empty());
    }

    #[test]
    fn single_mode_fold_hides_overlays() {
        let spread = spread_of(1, true, 4);
        let plan = plan_turn(Direction::Next, 1, true, 4).unwrap();
        let placed = place_overlays(&hotspots(), spread, &layout(true), TurnView::Turning { plan, progress: 0.1 });
        assert!(placed.is_empty());
    }
}

//! Which pages are visible, and where a turn leads.
//!
//! Pages are numbered from 1. In double (portrait) mode the left page of a
//! spread is always odd; in single (landscape) mode only one page shows.

/// Turn direction, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn step(self) -> i64 {
        match self {
            Direction::Next => 1,
            Direction::Prev => -1,
        }
    }
}

/// The one or two pages visible at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl Spread {
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.left.into_iter().chain(self.right)
    }
}

pub fn spread_of(current: u32, is_landscape: bool, total: u32) -> Spread {
    if total == 0 {
        return Spread {
            left: None,
            right: None,
        };
    }
    if is_landscape {
        return Spread {
            left: Some(current),
            right: None,
        };
    }
    let left = if current % 2 == 1 {
        current
    } else {
        current.saturating_sub(1).max(1)
    };
    Spread {
        left: Some(left),
        right: (left + 1 <= total).then_some(left + 1),
    }
}

/// Clamp a requested page into the document. Double mode lands on the odd
/// left page of the spread that contains it.
pub fn clamp_target(page: i64, total: u32, is_landscape: bool) -> u32 {
    if total == 0 {
        return 1;
    }
    let mut page = page.clamp(1, i64::from(total)) as u32;
    if !is_landscape && page % 2 == 0 {
        page -= 1;
    }
    page
}

pub fn is_next_legal(current: u32, is_landscape: bool, total: u32) -> bool {
    if is_landscape {
        return current < total;
    }
    matches!(spread_of(current, is_landscape, total).right, Some(right) if right < total)
}

pub fn is_prev_legal(current: u32, is_landscape: bool, total: u32) -> bool {
    if is_landscape {
        return current > 1;
    }
    matches!(spread_of(current, is_landscape, total).left, Some(left) if left > 1)
}

/// The pages involved in a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPlan {
    pub direction: Direction,
    /// Page whose front face folds away.
    pub turning: u32,
    /// Page on the back of the turning sheet.
    pub destination: u32,
    /// Page revealed beneath the turning sheet (double mode only).
    pub under: Option<u32>,
}

/// Work out which pages take part in a turn, or `None` when the turn is not
/// allowed from `current`.
pub fn plan_turn(direction: Direction, current: u32, is_landscape: bool, total: u32) -> Option<TurnPlan> {
    let legal = match direction {
        Direction::Next => is_next_legal(current, is_landscape, total),
        Direction::Prev => is_prev_legal(current, is_landscape, total),
    };
    if !legal {
        return None;
    }

    if is_landscape {
        let destination = match direction {
            Direction::Next => current + 1,
            Direction::Prev => current - 1,
        };
        return Some(TurnPlan {
            direction,
            turning: current,
            destination,
            under: None,
        });
    }

    let spread = spread_of(current, is_landscape, total);
    let plan = match direction {
        Direction::Next => {
            let turning = spread.right?;
            TurnPlan {
                direction,
                turning,
                destination: turning + 1,
                under: (turning + 2 <= total).then_some(turning + 2),
            }
        }
        Direction::Prev => {
            let turning = spread.left?;
            TurnPlan {
                direction,
                turning,
                destination: turning - 1,
                under: turning.checked_sub(2).filter(|&page| page >= 1),
            }
        }
    };
    Some(plan)
}

/// Current page once a turn in `direction` has completed.
pub fn settle(current: u32, direction: Direction, is_landscape: bool, total: u32) -> u32 {
    let stride = if is_landscape { 1 } else { 2 };
    let target = i64::from(current) + direction.step() * stride;
    clamp_target(target, total, is_landscape)
}

/// Text and boundary flags for the host's page indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndicator {
    pub display_text: String,
    pub at_start: bool,
    pub at_end: bool,
}

pub fn page_indicator(current: u32, is_landscape: bool, total: u32) -> PageIndicator {
    if is_landscape {
        return PageIndicator {
            display_text: current.to_string(),
            at_start: current <= 1,
            at_end: current >= total,
        };
    }
    let spread = spread_of(current, is_landscape, total);
    let left = spread.left.unwrap_or(1);
    let display_text = match spread.right {
        Some(right) => format!("{left}-{right}"),
        None => left.to_string(),
    };
    PageIndicator {
        display_text,
        at_start: left <= 1,
        at_end: spread.right.map_or(true, |right| right >= total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn double_spread_pairs_odd_left_page() {
        assert_eq!(
            spread_of(4, false, 10),
            Spread {
                left: Some(3),
                right: Some(4)
            }
        );
        assert_eq!(
            spread_of(9, false, 9),
            Spread {
                left: Some(9),
                right: None
            }
        );
    }

    #[test]
    fn single_spread_has_no_right_page() {
        assert_eq!(
            spread_of(1, true, 1),
            Spread {
                left: Some(1),
                right: None
            }
        );
    }

    #[test]
    fn clamp_forces_odd_in_double_mode() {
        assert_eq!(clamp_target(0, 10, false), 1);
        assert_eq!(clamp_target(10, 10, false), 9);
        assert_eq!(clamp_target(42, 10, true), 10);
        assert_eq!(clamp_target(6, 10, false), 5);
    }

    #[test]
    fn double_mode_legality() {
        assert!(is_next_legal(7, false, 10));
        // Spread 9-10 is the last one.
        assert!(!is_next_legal(9, false, 10));
        assert!(!is_prev_legal(1, false, 10));
        assert!(is_prev_legal(3, false, 10));
    }

    #[test]
    fn next_plan_skips_missing_under_page() {
        let plan = plan_turn(Direction::Next, 7, false, 9).unwrap();
        assert_eq!(
            plan,
            TurnPlan {
                direction: Direction::Next,
                turning: 8,
                destination: 9,
                under: None
            }
        );
    }

    #[test]
    fn prev_plan_reveals_two_back() {
        let plan = plan_turn(Direction::Prev, 5, false, 10).unwrap();
        assert_eq!((plan.turning, plan.destination, plan.under), (5, 4, Some(3)));
    }

    #[test]
    fn settle_clamps_at_the_boundaries() {
        assert_eq!(settle(1, Direction::Next, false, 10), 3);
        assert_eq!(settle(9, Direction::Next, false, 10), 9);
        assert_eq!(settle(1, Direction::Prev, false, 10), 1);
        assert_eq!(settle(4, Direction::Next, true, 4), 4);
    }

    #[test]
    fn indicator_text() {
        let indicator = page_indicator(3, false, 10);
        assert_eq!(indicator.display_text, "3-4");
        assert!(!indicator.at_start && !indicator.at_end);

        let last = page_indicator(9, false, 9);
        assert_eq!(last.display_text, "9");
        assert!(last.at_end);

        let single = page_indicator(1, true, 1);
        assert!(single.at_start && single.at_end);
    }
}

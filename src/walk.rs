use crate::GOAL;

/// Largest single step; one reflection off the goal suffices only because
/// this is far smaller than `GOAL`.
pub const MAX_STEP: u8 = 6;

/// Bounces an overshoot back off the goal cell as if it were a mirror.
///
/// Only one reflection is applied, so `position` must not exceed
/// `GOAL + MAX_STEP`.
pub fn reflect(position: usize) -> usize {
    debug_assert!(position <= GOAL + MAX_STEP as usize);
    if position > GOAL {
        GOAL - (position - GOAL)
    } else {
        position
    }
}

/// Where a step ended and whether it reached the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Landing {
    pub position: usize,
    pub goal: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Walker {
    position: usize,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: usize) -> Self {
        assert!(position <= GOAL);
        Self { position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves `step` cells forward. Reaching the goal sends the walker back to
    /// cell 0 for the next step, but the landing still reports the goal cell.
    pub fn advance(&mut self, step: u8) -> Landing {
        assert!((1..=MAX_STEP).contains(&step), "step out of range: {}", step);
        let landed = reflect(self.position + step as usize);
        let goal = landed == GOAL;
        self.position = if goal { 0 } else { landed };
        Landing {
            position: landed,
            goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_near_goal() {
        assert_eq!(reflect(497 + 6), 497);
        assert_eq!(reflect(498 + 6), 496);
        assert_eq!(reflect(499 + 6), 495);
        assert_eq!(reflect(500 + 6), 494);
        assert_eq!(reflect(500), 500);
        assert_eq!(reflect(123), 123);
    }

    #[test]
    fn overshoot_bounces_back() {
        let mut w = Walker::at(499);
        let landing = w.advance(6);
        assert_eq!(
            landing,
            Landing {
                position: 495,
                goal: false
            }
        );
        assert_eq!(w.position(), 495);
    }

    #[test]
    fn exact_hit_counts_as_goal_and_resets() {
        let mut w = Walker::at(494);
        let landing = w.advance(6);
        assert!(landing.goal);
        assert_eq!(landing.position, 500);
        assert_eq!(w.position(), 0);
        assert_eq!(w.advance(3).position, 3);
    }

    #[test]
    fn position_stays_on_board() {
        for start in 490..=500 {
            for step in 1..=MAX_STEP {
                let mut w = Walker::at(start);
                let landing = w.advance(step);
                assert!(landing.position <= GOAL);
                assert!(w.position() <= GOAL);
            }
        }
    }
}

use xchg_types::{Direction, Mode, RatioReading};

/// Infers which box the user is typing into from tick-to-tick changes.
#[derive(Debug, Clone)]
pub struct AutoResolver {
    remembered: Direction,
    last_inputs: Option<(u64, u64)>,
}

impl Default for AutoResolver {
    fn default() -> Self {
        Self {
            remembered: Direction::WantToHave,
            last_inputs: None,
        }
    }
}

impl AutoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_inputs(&self) -> Option<(u64, u64)> {
        self.last_inputs
    }

    pub fn resolve(
        &mut self,
        mode: Mode,
        left: Option<u64>,
        right: Option<u64>,
        ratio: Option<RatioReading>,
    ) -> Direction {
        if let Some(direction) = mode.direction() {
            return direction;
        }

        let (left, right) = match (left, right) {
            (None, Some(_)) => return Direction::WantToHave,
            (Some(_), None) => return Direction::HaveToWant,
            (None, None) => return self.remembered,
            (Some(left), Some(right)) => (left, right),
        };

        // The side quoted with the larger count is usually the one being typed
        if let Some(ratio) = ratio.filter(RatioReading::is_usable) {
            if ratio.numerator < ratio.denominator {
                self.remembered = Direction::HaveToWant;
            } else if ratio.numerator > ratio.denominator {
                self.remembered = Direction::WantToHave;
            }
        }

        let Some((last_left, last_right)) = self.last_inputs else {
            return self.remembered;
        };

        let left_delta = left.abs_diff(last_left);
        let right_delta = right.abs_diff(last_right);
        if left_delta == 0 && right_delta == 0 {
            return self.remembered;
        }

        self.remembered = if left_delta >= right_delta {
            Direction::HaveToWant
        } else {
            Direction::WantToHave
        };
        self.remembered
    }

    pub fn remember(&mut self, left: u64, right: u64) {
        self.last_inputs = Some((left, right));
    }

    pub fn forget(&mut self) {
        self.last_inputs = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_left_box_is_the_input() {
        let mut resolver = AutoResolver::new();
        resolver.remember(10, 20);

        let direction = resolver.resolve(Mode::Auto, Some(15), Some(20), None);
        assert_eq!(direction, Direction::HaveToWant);
        assert_eq!(direction.target_side(), xchg_types::Side::Right);
    }

    #[test]
    fn changed_right_box_is_the_input() {
        let mut resolver = AutoResolver::new();
        resolver.remember(10, 20);

        let direction = resolver.resolve(Mode::Auto, Some(10), Some(26), None);
        assert_eq!(direction, Direction::WantToHave);
    }

    #[test]
    fn larger_change_wins_and_ties_go_left() {
        let mut resolver = AutoResolver::new();
        resolver.remember(100, 100);
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(101), Some(150), None),
            Direction::WantToHave
        );
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(105), Some(105), None),
            Direction::HaveToWant
        );
    }

    #[test]
    fn unchanged_boxes_keep_the_remembered_direction() {
        let mut resolver = AutoResolver::new();
        resolver.remember(10, 20);
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(15), Some(20), None),
            Direction::HaveToWant
        );
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(10), Some(20), None),
            Direction::HaveToWant
        );
    }

    #[test]
    fn single_reading_is_the_input() {
        let mut resolver = AutoResolver::new();
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(3), None, None),
            Direction::HaveToWant
        );
        assert_eq!(
            resolver.resolve(Mode::Auto, None, Some(3), None),
            Direction::WantToHave
        );
        assert_eq!(
            resolver.resolve(Mode::Auto, None, None, None),
            Direction::WantToHave
        );
    }

    #[test]
    fn ratio_biases_first_guess() {
        let mut resolver = AutoResolver::new();
        let cheap = Some(RatioReading::new(1.0, 40.0));
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(1), Some(40), cheap),
            Direction::HaveToWant
        );

        let mut resolver = AutoResolver::new();
        let dear = Some(RatioReading::new(40.0, 1.0));
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(40), Some(1), dear),
            Direction::WantToHave
        );
    }

    #[test]
    fn fixed_modes_ignore_history() {
        let mut resolver = AutoResolver::new();
        resolver.remember(10, 20);
        assert_eq!(
            resolver.resolve(Mode::WantToHave, Some(99), Some(20), None),
            Direction::WantToHave
        );
        assert_eq!(
            resolver.resolve(Mode::HaveToWant, None, Some(20), None),
            Direction::HaveToWant
        );
    }

    #[test]
    fn forget_drops_previous_inputs() {
        let mut resolver = AutoResolver::new();
        resolver.remember(10, 20);
        resolver.forget();
        assert_eq!(resolver.last_inputs(), None);
        assert_eq!(
            resolver.resolve(Mode::Auto, Some(15), Some(20), None),
            Direction::WantToHave
        );
    }
}

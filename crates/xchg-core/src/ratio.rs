//! Ratio arithmetic.
//!
//! A ratio `N:D` reads as "N of the left currency per D of the right
//! currency", so matching boxes satisfy `left / N == right / D`.

use xchg_types::{Direction, RatioReading};

use crate::error::Unavailable;

/// Value for the target side of `direction`, given the input side's value.
///
/// Pure: identical inputs always give the identical result.
pub fn recompute(
    direction: Direction,
    ratio: RatioReading,
    value: f64,
) -> Result<f64, Unavailable> {
    if !ratio.is_usable() {
        return Err(Unavailable::RatioNotReady);
    }
    if !value.is_finite() || value < 0.0 {
        return Err(Unavailable::InputNotReady);
    }

    let RatioReading {
        numerator,
        denominator,
    } = ratio;

    Ok(match direction {
        Direction::HaveToWant => value * denominator / numerator,
        Direction::WantToHave => value * numerator / denominator,
    })
}

/// Same as [`recompute`] with optional readings.
pub fn recommend(
    direction: Direction,
    ratio: Option<RatioReading>,
    value: Option<u64>,
) -> Result<f64, Unavailable> {
    let ratio = ratio.ok_or(Unavailable::RatioNotReady)?;
    if !ratio.is_usable() {
        return Err(Unavailable::RatioNotReady);
    }
    let value = value.ok_or(Unavailable::InputNotReady)?;
    recompute(direction, ratio, value as f64)
}

/// Expected (left, right) values, each computed from the opposite box.
pub fn expected_pair(
    ratio: Option<RatioReading>,
    left: Option<u64>,
    right: Option<u64>,
) -> (Option<f64>, Option<f64>) {
    let expected_left = recommend(Direction::WantToHave, ratio, right).ok();
    let expected_right = recommend(Direction::HaveToWant, ratio, left).ok();
    (expected_left, expected_right)
}

/// Box values are whole numbers
pub fn round_for_display(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn two_to_one_have_to_want() {
        let ratio = RatioReading::new(2.0, 1.0);
        let right = recompute(Direction::HaveToWant, ratio, 50.0).unwrap();
        assert_eq!(right, 25.0);
    }

    #[test]
    fn want_to_have_inverts() {
        let ratio = RatioReading::new(2.0, 1.0);
        let left = recompute(Direction::WantToHave, ratio, 25.0).unwrap();
        assert_eq!(left, 50.0);
    }

    #[test]
    fn round_trip_returns_input() {
        let ratios = [(2.0, 1.0), (1.0, 3.0), (12.5, 1.0), (0.37, 41.0), (999.99, 0.01)];
        let values = [0.0, 1.0, 7.0, 50.0, 1234.0, 99_999_999.0];

        for (n, d) in ratios {
            let ratio = RatioReading::new(n, d);
            for v in values {
                let forward = recompute(Direction::HaveToWant, ratio, v).unwrap();
                let back = recompute(Direction::WantToHave, ratio, forward).unwrap();
                assert!(approx_eq(back, v), "{n}:{d} with {v} came back as {back}");
            }
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let ratio = RatioReading::new(3.3, 7.0);
        let first = recompute(Direction::WantToHave, ratio, 420.0);
        let second = recompute(Direction::WantToHave, ratio, 420.0);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_terms_are_unavailable() {
        for (n, d) in [(0.0, 1.0), (1.0, 0.0), (0.0, 0.0), (-2.0, 1.0), (f64::NAN, 1.0)] {
            let ratio = RatioReading::new(n, d);
            for direction in [Direction::HaveToWant, Direction::WantToHave] {
                assert_eq!(
                    recompute(direction, ratio, 10.0),
                    Err(Unavailable::RatioNotReady)
                );
            }
        }
    }

    #[test]
    fn missing_input_is_unavailable() {
        let ratio = Some(RatioReading::new(2.0, 1.0));
        assert_eq!(
            recommend(Direction::HaveToWant, ratio, None),
            Err(Unavailable::InputNotReady)
        );
        assert_eq!(
            recommend(Direction::HaveToWant, None, Some(5)),
            Err(Unavailable::RatioNotReady)
        );
        assert_eq!(
            recompute(Direction::HaveToWant, RatioReading::new(2.0, 1.0), -1.0),
            Err(Unavailable::InputNotReady)
        );
    }

    #[test]
    fn ratio_is_checked_before_input() {
        let ratio = Some(RatioReading::new(0.0, 1.0));
        assert_eq!(
            recommend(Direction::WantToHave, ratio, None),
            Err(Unavailable::RatioNotReady)
        );
    }

    #[test]
    fn expected_pair_uses_opposite_boxes() {
        let ratio = Some(RatioReading::new(2.0, 1.0));
        let (left, right) = expected_pair(ratio, Some(50), Some(30));
        assert_eq!(left, Some(60.0));
        assert_eq!(right, Some(25.0));

        let (left, right) = expected_pair(ratio, None, Some(30));
        assert_eq!(left, Some(60.0));
        assert_eq!(right, None);
    }

    #[test]
    fn display_rounding() {
        assert_eq!(round_for_display(24.5), Some(25));
        assert_eq!(round_for_display(24.49), Some(24));
        assert_eq!(round_for_display(f64::INFINITY), None);
    }
}

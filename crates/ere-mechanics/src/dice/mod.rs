//! Dice rolling.
//!
//! All randomness flows through a [`DiceRoller`], so a session can use a
//! seeded [`StdRng`] for reproducible play or [`FixedRolls`] to force exact
//! results. Expressions use the `NdS` / `NdS+B` notation; a malformed
//! expression degrades to a roll of 1 instead of failing.

pub mod expression;

pub use expression::{DiceExpression, ExpressionRoll, MAX_DICE};

use rand::Rng;
use rand::rngs::StdRng;

/// Result used when an expression cannot be parsed.
pub const FALLBACK_ROLL: i32 = 1;

/// A source of die results.
pub trait DiceRoller {
    /// Roll one die with `sides` faces, returning a value in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll a d20.
    fn roll_d20(&mut self) -> u32 {
        self.roll_die(20)
    }

    /// Pick a uniformly random index in `[0, len)`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let sides = u32::try_from(len).unwrap_or(u32::MAX);
        (self.roll_die(sides) as usize).saturating_sub(1)
    }
}

impl DiceRoller for StdRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.random_range(0..len.max(1))
    }
}

impl<R: DiceRoller + ?Sized> DiceRoller for &mut R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

/// A scripted roller that replays a fixed sequence of die faces, cycling.
///
/// Each value is clamped into `[1, sides]` of the die being rolled, so a
/// script can never produce an impossible face.
#[derive(Debug, Clone)]
pub struct FixedRolls {
    values: Vec<u32>,
    index: usize,
}

impl FixedRolls {
    /// Create a roller that returns `values` in order, then starts over.
    /// An empty script always rolls 1.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            index: 0,
        }
    }

    /// How many values have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl DiceRoller for FixedRolls {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let value = if self.values.is_empty() {
            1
        } else {
            self.values[self.index % self.values.len()]
        };
        self.index += 1;
        value.clamp(1, sides.max(1))
    }
}

/// Roll a single die.
pub fn roll_die(roller: &mut impl DiceRoller, sides: u32) -> u32 {
    roller.roll_die(sides.max(1))
}

/// Roll a d20.
pub fn roll_d20(roller: &mut impl DiceRoller) -> u32 {
    roller.roll_d20()
}

/// Evaluate a dice expression such as `"2d4+2"`.
///
/// Returns [`FALLBACK_ROLL`] when the expression is malformed; callers must
/// tolerate that degraded result.
pub fn roll_expression(roller: &mut impl DiceRoller, expr: &str) -> i32 {
    match DiceExpression::parse(expr) {
        Ok(parsed) => parsed.roll(roller).total,
        Err(_) => {
            tracing::warn!(expression = expr, "malformed dice expression, using fallback roll");
            FALLBACK_ROLL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn roll_die_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let v = roll_die(&mut rng, 6);
            assert!((1..=6).contains(&v));
        }
    }

    #[test]
    fn zero_sided_die_rolls_one() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll_die(&mut rng, 0), 1);
    }

    #[test]
    fn d20_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = roll_d20(&mut rng);
            assert!((1..=20).contains(&v));
        }
    }

    #[test]
    fn malformed_expression_falls_back_to_one() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(roll_expression(&mut rng, "fireball"), FALLBACK_ROLL);
        assert_eq!(roll_expression(&mut rng, ""), FALLBACK_ROLL);
        assert_eq!(roll_expression(&mut rng, "0d6"), FALLBACK_ROLL);
    }

    #[test]
    fn expression_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = roll_expression(&mut rng, "2d4+2");
            assert!((4..=10).contains(&v));
        }
    }

    #[test]
    fn expression_mean_approaches_expected() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 1000;
        let sum: i64 = (0..n)
            .map(|_| i64::from(roll_expression(&mut rng, "3d6+2")))
            .sum();
        let mean = sum as f64 / n as f64;
        // 3 * 3.5 + 2 = 12.5; sd of the mean is about 0.09
        assert!((mean - 12.5).abs() < 0.5, "mean was {mean}");
    }

    #[test]
    fn fixed_rolls_cycle_and_clamp() {
        let mut fixed = FixedRolls::new(vec![16, 3, 25]);
        assert_eq!(fixed.roll_d20(), 16);
        assert_eq!(fixed.roll_die(6), 3);
        assert_eq!(fixed.roll_die(20), 20);
        assert_eq!(fixed.roll_d20(), 16);
        assert_eq!(fixed.consumed(), 4);
    }

    #[test]
    fn fixed_rolls_pick_index() {
        let mut fixed = FixedRolls::new(vec![2]);
        assert_eq!(fixed.pick_index(3), 1);
        let mut empty = FixedRolls::new(Vec::new());
        assert_eq!(empty.pick_index(4), 0);
    }

    #[test]
    fn roller_through_mut_reference() {
        let mut fixed = FixedRolls::new(vec![5]);
        let mut by_ref = &mut fixed;
        assert_eq!(roll_die(&mut by_ref, 8), 5);
    }
}

//! Dice expressions (`NdS` / `NdS+B`) and their detailed results.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DiceRoller;
use crate::error::MechError;

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*[dD]\s*(\d+)\s*(?:\+\s*(\d+))?\s*$").expect("dice pattern is valid")
});

/// Most dice a single expression may roll.
pub const MAX_DICE: u32 = 100;

/// A parsed dice expression: roll `count` dice of `sides` faces and add `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    /// Number of dice (1 to [`MAX_DICE`]).
    pub count: u32,
    /// Faces per die (at least 1).
    pub sides: u32,
    /// Flat non-negative bonus.
    pub bonus: u32,
}

impl DiceExpression {
    /// Create an expression directly.
    pub fn new(count: u32, sides: u32, bonus: u32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Parse `"NdS"` or `"NdS+B"`.
    pub fn parse(input: &str) -> Result<Self, MechError> {
        let invalid = || MechError::InvalidExpression(input.to_string());
        let caps = EXPRESSION.captures(input).ok_or_else(invalid)?;

        let count: u32 = caps[1].parse().map_err(|_| invalid())?;
        let sides: u32 = caps[2].parse().map_err(|_| invalid())?;
        let bonus: u32 = match caps.get(3) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        if count == 0 || sides == 0 {
            return Err(invalid());
        }
        if count > MAX_DICE {
            return Err(MechError::TooManyDice {
                count,
                max: MAX_DICE,
            });
        }
        Ok(Self::new(count, sides, bonus))
    }

    /// Smallest possible total.
    pub fn min(&self) -> i64 {
        i64::from(self.count) + i64::from(self.bonus)
    }

    /// Largest possible total.
    pub fn max(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + i64::from(self.bonus)
    }

    /// Expected mean total, `N * (S + 1) / 2 + B`.
    pub fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 + f64::from(self.bonus)
    }

    /// Roll every die and return the detailed result.
    pub fn roll(&self, roller: &mut impl DiceRoller) -> ExpressionRoll {
        let values: Vec<u32> = (0..self.count)
            .map(|_| roller.roll_die(self.sides))
            .collect();
        let sum = values
            .iter()
            .fold(u64::from(self.bonus), |acc, v| acc + u64::from(*v));
        ExpressionRoll {
            expression: *self,
            values,
            total: i32::try_from(sum).unwrap_or(i32::MAX),
        }
    }
}

impl FromStr for DiceExpression {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bonus > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.bonus)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// The outcome of rolling a [`DiceExpression`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionRoll {
    /// The expression that was rolled.
    pub expression: DiceExpression,
    /// Individual die faces.
    pub values: Vec<u32>,
    /// Sum of the faces plus the bonus.
    pub total: i32,
}

impl fmt::Display for ExpressionRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        if self.expression.bonus > 0 {
            write!(
                f,
                "[{}]+{} = {}",
                values.join(", "),
                self.expression.bonus,
                self.total
            )
        } else {
            write!(f, "[{}] = {}", values.join(", "), self.total)
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// A companion's disposition toward the player, clamped to `[-100, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Relationship(i32);

impl Relationship {
    /// Lowest possible score.
    pub const MIN: i32 = -100;
    /// Highest possible score.
    pub const MAX: i32 = 100;

    /// A fresh relationship at 0.
    pub fn new() -> Self {
        Self(0)
    }

    /// A relationship at the given score, clamped into range.
    pub fn with_score(score: i32) -> Self {
        Self(score.clamp(Self::MIN, Self::MAX))
    }

    /// The current score.
    pub fn score(self) -> i32 {
        self.0
    }

    /// Shift the score by `delta`, clamping to bounds. Returns the new score.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.0 = self.0.saturating_add(delta).clamp(Self::MIN, Self::MAX);
        self.0
    }

    /// The descriptive tier for the current score.
    pub fn tier(self) -> RelationshipTier {
        RelationshipTier::for_score(self.0)
    }
}

impl From<i32> for Relationship {
    fn from(score: i32) -> Self {
        Self::with_score(score)
    }
}

impl From<Relationship> for i32 {
    fn from(rel: Relationship) -> Self {
        rel.0
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// A human-readable band of relationship scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipTier {
    /// Below zero.
    Hostile,
    /// 0 to 19.
    Wary,
    /// 20 to 39.
    Neutral,
    /// 40 to 59.
    Friendly,
    /// 60 to 79.
    Close,
    /// 80 and above.
    Devoted,
}

impl RelationshipTier {
    /// Classify a raw score.
    pub fn for_score(score: i32) -> Self {
        match score {
            80.. => Self::Devoted,
            60..=79 => Self::Close,
            40..=59 => Self::Friendly,
            20..=39 => Self::Neutral,
            0..=19 => Self::Wary,
            _ => Self::Hostile,
        }
    }
}

impl fmt::Display for RelationshipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hostile => write!(f, "Hostile"),
            Self::Wary => write!(f, "Wary"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Friendly => write!(f, "Friendly"),
            Self::Close => write!(f, "Close"),
            Self::Devoted => write!(f, "Devoted"),
        }
    }
}

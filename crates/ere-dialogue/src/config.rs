//! Configuration for dialogue sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How much dialogue outcomes move a companion's relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipRules {
    /// Gain for a successful skill or persuasion check.
    pub check_success_bonus: i32,
    /// Gain for a romance option.
    pub romance_bonus: i32,
    /// Loss for a failed intimidation attempt.
    pub intimidation_penalty: i32,
}

impl Default for RelationshipRules {
    fn default() -> Self {
        Self {
            check_success_bonus: 10,
            romance_bonus: 10,
            intimidation_penalty: 15,
        }
    }
}

/// Tunables for a [`Conversation`](crate::Conversation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// RNG seed for reproducible checks. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Pause before moving to the next node, in milliseconds.
    pub advance_delay_ms: u64,
    /// Relationship increments.
    pub rules: RelationshipRules,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            seed: None,
            advance_delay_ms: 1000,
            rules: RelationshipRules::default(),
        }
    }
}

impl DialogueConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the auto-advance delay.
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Replace the relationship rules.
    pub fn with_rules(mut self, rules: RelationshipRules) -> Self {
        self.rules = rules;
        self
    }

    /// Auto-advance delay as a duration.
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

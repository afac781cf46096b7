//! Configuration for a combat encounter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for an [`Encounter`](crate::Encounter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// RNG seed for reproducible fights. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Pause before an enemy acts, in milliseconds.
    pub enemy_turn_delay_ms: u64,
    /// Pause between the final blow and the end signal, in milliseconds.
    pub end_signal_delay_ms: u64,
    /// Armor class bonus granted by the defend action.
    pub defend_bonus: i32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: None,
            enemy_turn_delay_ms: 1500,
            end_signal_delay_ms: 2000,
            defend_bonus: 2,
        }
    }
}

impl EncounterConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the enemy turn delay.
    pub fn with_enemy_turn_delay(mut self, delay: Duration) -> Self {
        self.enemy_turn_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the end signal delay.
    pub fn with_end_signal_delay(mut self, delay: Duration) -> Self {
        self.end_signal_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the defend bonus (negative values are treated as 0).
    pub fn with_defend_bonus(mut self, bonus: i32) -> Self {
        self.defend_bonus = bonus.max(0);
        self
    }

    /// Enemy turn delay as a duration.
    pub fn enemy_turn_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_turn_delay_ms)
    }

    /// End signal delay as a duration.
    pub fn end_signal_delay(&self) -> Duration {
        Duration::from_millis(self.end_signal_delay_ms)
    }
}

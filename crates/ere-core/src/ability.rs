use std::fmt;

use serde::{Deserialize, Serialize};

/// Score used for an ability a check names but the character sheet does not know.
pub const UNTRAINED_SCORE: i32 = 10;

/// Derive an ability modifier from a raw ability score.
///
/// Standard tabletop formula, `floor((score - 10) / 2)`: 8 gives -1,
/// 10 gives 0, 15 gives +2.
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// One of the six classic abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Physical power; drives attack rolls.
    Strength,
    /// Agility and reflexes; drives initiative.
    Dexterity,
    /// Endurance.
    Constitution,
    /// Reasoning and memory.
    Intelligence,
    /// Perception and insight.
    Wisdom,
    /// Force of personality.
    Charisma,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// Parse an ability from a key like "wisdom", "WIS", or "Charisma".
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "strength" | "str" => Some(Self::Strength),
            "dexterity" | "dex" => Some(Self::Dexterity),
            "constitution" | "con" => Some(Self::Constitution),
            "intelligence" | "int" => Some(Self::Intelligence),
            "wisdom" | "wis" => Some(Self::Wisdom),
            "charisma" | "cha" => Some(Self::Charisma),
            _ => None,
        }
    }

    /// Three-letter abbreviation used in compact tables.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Strength => "STR",
            Self::Dexterity => "DEX",
            Self::Constitution => "CON",
            Self::Intelligence => "INT",
            Self::Wisdom => "WIS",
            Self::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strength => write!(f, "Strength"),
            Self::Dexterity => write!(f, "Dexterity"),
            Self::Constitution => write!(f, "Constitution"),
            Self::Intelligence => write!(f, "Intelligence"),
            Self::Wisdom => write!(f, "Wisdom"),
            Self::Charisma => write!(f, "Charisma"),
        }
    }
}

/// A complete block of the six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    /// Strength score.
    pub strength: i32,
    /// Dexterity score.
    pub dexterity: i32,
    /// Constitution score.
    pub constitution: i32,
    /// Intelligence score.
    pub intelligence: i32,
    /// Wisdom score.
    pub wisdom: i32,
    /// Charisma score.
    pub charisma: i32,
}

impl AbilityScores {
    /// Build a stat block in sheet order (STR, DEX, CON, INT, WIS, CHA).
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    /// A stat block with every ability set to the same score.
    pub fn uniform(score: i32) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    /// Get the score for an ability.
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Set the score for an ability.
    pub fn set(&mut self, ability: Ability, score: i32) {
        match ability {
            Ability::Strength => self.strength = score,
            Ability::Dexterity => self.dexterity = score,
            Ability::Constitution => self.constitution = score,
            Ability::Intelligence => self.intelligence = score,
            Ability::Wisdom => self.wisdom = score,
            Ability::Charisma => self.charisma = score,
        }
    }

    /// The modifier for an ability.
    pub fn modifier(&self, ability: Ability) -> i32 {
        modifier(self.get(ability))
    }

    /// Look up a score by free-form key, falling back to [`UNTRAINED_SCORE`]
    /// when the key names no known ability.
    pub fn score_for_key(&self, key: &str) -> i32 {
        Ability::from_key(key)
            .map(|a| self.get(a))
            .unwrap_or(UNTRAINED_SCORE)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

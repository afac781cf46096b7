use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityScores};
use crate::relationship::Relationship;

/// Ability score given to every ability of an enemy built without a stat block.
pub const DEFAULT_ENEMY_ABILITY: i32 = 14;
/// Armor class given to combatants that carry no armor data.
pub const DEFAULT_ARMOR_CLASS: i32 = 13;
/// Damage expression used for a basic attack when none is supplied.
pub const DEFAULT_ATTACK_DAMAGE: &str = "1d6";

/// Stable identifier of a combatant, e.g. `"astarion"` or `"goblin1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl CombatantId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which side of an encounter a combatant fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allegiance {
    /// A party member.
    Ally,
    /// A hostile actor.
    Enemy,
}

impl fmt::Display for Allegiance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ally => write!(f, "ally"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// A party member or enemy with a complete stat block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CombatantRecord")]
pub struct Combatant {
    /// Stable identifier.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Which side this combatant is on.
    pub allegiance: Allegiance,
    /// Current hit points (0 to `max_hp`).
    hp: i32,
    /// Maximum hit points.
    max_hp: i32,
    /// Defense threshold an attack total must reach.
    pub armor_class: i32,
    /// The six ability scores.
    pub abilities: AbilityScores,
    /// Initiative for the current encounter (higher acts first).
    pub initiative: i32,
    /// Damage expression for a basic attack.
    pub attack_damage: String,
    /// True for the player-controlled main character.
    pub is_player: bool,
    /// Disposition toward the player; only companions carry one.
    pub relationship: Option<Relationship>,
}

/// Wire form of [`Combatant`]; hit points are clamped on the way in.
#[derive(Deserialize)]
struct CombatantRecord {
    id: CombatantId,
    name: String,
    allegiance: Allegiance,
    hp: i32,
    max_hp: i32,
    armor_class: i32,
    abilities: AbilityScores,
    initiative: i32,
    attack_damage: String,
    is_player: bool,
    relationship: Option<Relationship>,
}

impl From<CombatantRecord> for Combatant {
    fn from(raw: CombatantRecord) -> Self {
        let max_hp = raw.max_hp.max(0);
        Self {
            id: raw.id,
            name: raw.name,
            allegiance: raw.allegiance,
            hp: raw.hp.clamp(0, max_hp),
            max_hp,
            armor_class: raw.armor_class,
            abilities: raw.abilities,
            initiative: raw.initiative,
            attack_damage: raw.attack_damage,
            is_player: raw.is_player,
            relationship: raw.relationship,
        }
    }
}

impl Combatant {
    /// Create a party member at full health with the default armor class.
    pub fn ally(
        id: impl Into<String>,
        name: impl Into<String>,
        max_hp: i32,
        abilities: AbilityScores,
    ) -> Self {
        let max_hp = max_hp.max(0);
        Self {
            id: CombatantId::new(id),
            name: name.into(),
            allegiance: Allegiance::Ally,
            hp: max_hp,
            max_hp,
            armor_class: DEFAULT_ARMOR_CLASS,
            abilities,
            initiative: 0,
            attack_damage: DEFAULT_ATTACK_DAMAGE.to_string(),
            is_player: false,
            relationship: None,
        }
    }

    /// Create an enemy at full health. Abilities default to
    /// [`DEFAULT_ENEMY_ABILITY`] across the board.
    pub fn enemy(
        id: impl Into<String>,
        name: impl Into<String>,
        max_hp: i32,
        armor_class: i32,
        attack_damage: impl Into<String>,
        initiative: i32,
    ) -> Self {
        let max_hp = max_hp.max(0);
        Self {
            id: CombatantId::new(id),
            name: name.into(),
            allegiance: Allegiance::Enemy,
            hp: max_hp,
            max_hp,
            armor_class,
            abilities: AbilityScores::uniform(DEFAULT_ENEMY_ABILITY),
            initiative,
            attack_damage: attack_damage.into(),
            is_player: false,
            relationship: None,
        }
    }

    /// Mark this combatant as the player character.
    pub fn as_player(mut self) -> Self {
        self.is_player = true;
        self.relationship = None;
        self
    }

    /// Give this combatant a fresh relationship score (a companion).
    pub fn as_companion(mut self) -> Self {
        self.is_player = false;
        self.relationship = Some(Relationship::new());
        self
    }

    /// Set the current hit points, clamped to `[0, max_hp]`.
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.set_hp(hp);
        self
    }

    /// Override the armor class.
    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    /// Override the ability scores.
    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    /// Override the basic attack damage expression.
    pub fn with_attack_damage(mut self, expr: impl Into<String>) -> Self {
        self.attack_damage = expr.into();
        self
    }

    /// Current hit points.
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points.
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Set current hit points, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    /// Score for a single ability.
    pub fn score(&self, ability: Ability) -> i32 {
        self.abilities.get(ability)
    }

    /// Returns true if the combatant is at 0 hit points.
    pub fn is_incapacitated(&self) -> bool {
        self.hp <= 0
    }

    /// Returns true if the combatant can still act and be targeted.
    pub fn is_alive(&self) -> bool {
        !self.is_incapacitated()
    }

    /// Subtract damage, flooring at 0. Returns the new hit points.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.set_hp(self.hp.saturating_sub(amount.max(0)));
        self.hp
    }

    /// Restore hit points, capped at the maximum. Returns the amount
    /// actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.set_hp(self.hp.saturating_add(amount.max(0)));
        self.hp - before
    }

    /// Fraction of hit points remaining (0.0 to 1.0).
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp)
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{} HP)", self.name, self.hp, self.max_hp)
    }
}

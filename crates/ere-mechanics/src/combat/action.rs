//! Action templates a combatant can choose on its turn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Healing rolled by the standard potion.
pub const HEALING_POTION_EXPRESSION: &str = "2d4+2";

/// The resolution rule an action follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Roll to hit against armor class, then roll damage.
    Attack,
    /// Always hits; roll damage.
    Spell,
    /// Brace for incoming attacks.
    Defend,
    /// Use a consumable on yourself.
    Item,
}

impl ActionKind {
    /// Returns true if the action must be aimed at an enemy.
    pub fn requires_target(self) -> bool {
        matches!(self, Self::Attack | Self::Spell)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Spell => write!(f, "spell"),
            Self::Defend => write!(f, "defend"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// A read-only action template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Stable identifier used by [`Encounter::send_action`](crate::Encounter::send_action).
    pub id: String,
    /// Resolution rule.
    pub kind: ActionKind,
    /// Display name.
    pub name: String,
    /// Damage or healing expression, if the action rolls one.
    pub expression: Option<String>,
    /// Player-facing description.
    pub description: String,
}

impl Action {
    /// Create an action template.
    pub fn new(
        id: impl Into<String>,
        kind: ActionKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            expression: None,
            description: description.into(),
        }
    }

    /// Attach a damage or healing expression.
    pub fn with_expression(mut self, expr: impl Into<String>) -> Self {
        self.expression = Some(expr.into());
        self
    }

    /// A melee weapon attack.
    pub fn weapon_attack() -> Self {
        Self::new(
            "weapon_attack",
            ActionKind::Attack,
            "Weapon Attack",
            "A regular melee attack",
        )
        .with_expression("1d8+3")
    }

    /// An auto-hitting bolt of force.
    pub fn magic_missile() -> Self {
        Self::new(
            "magic_missile",
            ActionKind::Spell,
            "Magic Missile",
            "A spell that always hits",
        )
        .with_expression("1d4+1")
    }

    /// Take a defensive stance.
    pub fn defend() -> Self {
        Self::new(
            "defend",
            ActionKind::Defend,
            "Defend",
            "Gain +2 AC until your next turn",
        )
    }

    /// Drink a healing potion.
    pub fn healing_potion() -> Self {
        Self::new(
            "healing_potion",
            ActionKind::Item,
            "Healing Potion",
            "Restore 2d4+2 HP",
        )
        .with_expression(HEALING_POTION_EXPRESSION)
    }

    /// The basic attack an enemy makes with its own damage expression.
    pub fn basic_attack(damage: impl Into<String>) -> Self {
        Self::new(
            "basic_attack",
            ActionKind::Attack,
            "Attack",
            "A basic attack",
        )
        .with_expression(damage)
    }

    /// The actions offered to the party on every turn.
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::weapon_attack(),
            Self::magic_missile(),
            Self::defend(),
            Self::healing_potion(),
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(expr) => write!(f, "{} ({expr})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

//! Pure action resolution.
//!
//! Resolvers read the combatants involved, roll through the supplied
//! [`DiceRoller`] and describe the outcome as an [`Effect`] plus log lines.
//! Nothing here touches a roster; the encounter applies the effect.

use std::fmt;

use ere_core::{Ability, Combatant, CombatantId};

use crate::combat::action::{Action, HEALING_POTION_EXPRESSION};
use crate::dice::{self, DiceRoller};

/// The state change a resolution asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Subtract hit points from a target.
    Damage {
        /// Who is hit.
        target: CombatantId,
        /// Rolled damage.
        amount: i32,
    },
    /// Restore hit points to a combatant (already capped at its maximum).
    Heal {
        /// Who is healed.
        target: CombatantId,
        /// Hit points actually restored.
        amount: i32,
    },
    /// The actor braces until its next turn.
    Defend {
        /// Who is defending.
        actor: CombatantId,
    },
    /// Nothing changes (a missed attack).
    None,
}

/// The numbers behind an attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    /// Natural d20 result.
    pub roll: i32,
    /// Strength modifier added to the roll.
    pub bonus: i32,
    /// `roll + bonus`.
    pub total: i32,
    /// Armor class the total was compared against.
    pub target_ac: i32,
    /// Whether the total reached the armor class.
    pub hit: bool,
}

impl fmt::Display for AttackRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.hit { "hit!" } else { "miss!" };
        write!(f, "{}{:+}={} ({verdict})", self.roll, self.bonus, self.total)
    }
}

/// Outcome of resolving one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// State change to apply.
    pub effect: Effect,
    /// Log lines, in order.
    pub lines: Vec<String>,
    /// Attack roll details, for attacks.
    pub attack: Option<AttackRoll>,
}

fn damage_expression<'a>(actor: &'a Combatant, action: &'a Action) -> &'a str {
    action.expression.as_deref().unwrap_or(&actor.attack_damage)
}

/// Roll to hit and, on a hit, roll damage.
///
/// `target_ac` is the effective armor class, including any defend bonus.
pub fn resolve_attack(
    actor: &Combatant,
    target: &Combatant,
    action: &Action,
    target_ac: i32,
    roller: &mut impl DiceRoller,
) -> Resolution {
    let roll = i32::try_from(roller.roll_d20()).unwrap_or(1);
    let bonus = actor.abilities.modifier(Ability::Strength);
    let total = roll + bonus;
    let attack = AttackRoll {
        roll,
        bonus,
        total,
        target_ac,
        hit: total >= target_ac,
    };

    let mut lines = vec![format!("{} attacks {}: {attack}", actor.name, target.name)];
    let effect = if attack.hit {
        let amount = dice::roll_expression(roller, damage_expression(actor, action));
        lines.push(format!("Damage: {amount}"));
        Effect::Damage {
            target: target.id.clone(),
            amount,
        }
    } else {
        Effect::None
    };

    Resolution {
        effect,
        lines,
        attack: Some(attack),
    }
}

/// Cast a damaging spell. Spells never miss.
pub fn resolve_spell(
    actor: &Combatant,
    target: &Combatant,
    action: &Action,
    roller: &mut impl DiceRoller,
) -> Resolution {
    let amount = dice::roll_expression(roller, damage_expression(actor, action));
    Resolution {
        effect: Effect::Damage {
            target: target.id.clone(),
            amount,
        },
        lines: vec![
            format!("{} casts {} at {}", actor.name, action.name, target.name),
            format!("Damage: {amount}"),
        ],
        attack: None,
    }
}

/// Take a defensive stance worth `bonus` armor class.
pub fn resolve_defend(actor: &Combatant, bonus: i32) -> Resolution {
    Resolution {
        effect: Effect::Defend {
            actor: actor.id.clone(),
        },
        lines: vec![format!(
            "{} takes a defensive stance ({bonus:+} AC)",
            actor.name
        )],
        attack: None,
    }
}

/// Drink a healing potion. The logged amount is what was actually restored.
pub fn resolve_item(actor: &Combatant, action: &Action, roller: &mut impl DiceRoller) -> Resolution {
    let expr = action
        .expression
        .as_deref()
        .unwrap_or(HEALING_POTION_EXPRESSION);
    let rolled = dice::roll_expression(roller, expr);
    let missing = (actor.max_hp() - actor.hp()).max(0);
    let amount = rolled.clamp(0, missing);
    Resolution {
        effect: Effect::Heal {
            target: actor.id.clone(),
            amount,
        },
        lines: vec![format!(
            "{} drinks a healing potion and restores {amount} HP",
            actor.name
        )],
        attack: None,
    }
}

//! Resolving a chosen option: ability checks and relationship deltas.

use std::fmt;

use serde::{Deserialize, Serialize};

use ere_core::{Ability, Combatant, modifier};
use ere_mechanics::DiceRoller;

use crate::config::RelationshipRules;
use crate::node::{DialogueOption, OptionKind};

/// Which canned response a speaker gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    /// A romance option or a successful skill or persuasion check.
    Positive,
    /// The speaker backs down.
    IntimidationSuccess,
    /// The speaker is not impressed.
    IntimidationFailure,
    /// A failed skill or persuasion check.
    SkillFailure,
    /// A plain reply.
    Neutral,
}

impl ResponseCategory {
    /// Every category, in declaration order.
    pub const ALL: [ResponseCategory; 5] = [
        Self::Positive,
        Self::IntimidationSuccess,
        Self::IntimidationFailure,
        Self::SkillFailure,
        Self::Neutral,
    ];
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::IntimidationSuccess => write!(f, "intimidation_success"),
            Self::IntimidationFailure => write!(f, "intimidation_failure"),
            Self::SkillFailure => write!(f, "skill_failure"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// A resolved ability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRoll {
    /// Ability name as shown to the player.
    pub ability: String,
    /// Natural d20.
    pub roll: i32,
    /// Ability modifier.
    pub modifier: i32,
    /// `roll + modifier`.
    pub total: i32,
    /// Difficulty the total had to reach.
    pub difficulty: i32,
    /// Whether the check succeeded.
    pub success: bool,
}

impl fmt::Display for CheckRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.modifier < 0 { '-' } else { '+' };
        let verdict = if self.success { "Success" } else { "Failure" };
        write!(
            f,
            "{} check: {} {sign} {} = {} vs DC {} ({verdict})",
            self.ability,
            self.roll,
            self.modifier.abs(),
            self.total,
            self.difficulty
        )
    }
}

/// Everything choosing an option decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOutcome {
    /// The check, if the option rolled one.
    pub check: Option<CheckRoll>,
    /// Which response the speaker gives.
    pub category: ResponseCategory,
    /// Relationship change before clamping.
    pub relationship_delta: i32,
}

/// Roll a d20 check for `option` using `character`'s ability score.
///
/// An option naming no ability, or an unknown one, uses an untrained score.
pub fn roll_check(
    option: &DialogueOption,
    character: &Combatant,
    roller: &mut impl DiceRoller,
) -> CheckRoll {
    let key = option.ability.as_deref().unwrap_or_default();
    let ability = match Ability::from_key(key) {
        Some(a) => a.to_string(),
        None => {
            tracing::debug!(ability = key, "unknown check ability, using untrained score");
            if key.is_empty() {
                "Untrained".to_string()
            } else {
                key.to_string()
            }
        }
    };
    let roll = i32::try_from(roller.roll_d20()).unwrap_or(1);
    let modifier = modifier(character.abilities.score_for_key(key));
    let total = roll + modifier;
    let difficulty = option.effective_difficulty();
    CheckRoll {
        ability,
        roll,
        modifier,
        total,
        difficulty,
        success: total >= difficulty,
    }
}

/// Decide the outcome of choosing `option`.
pub fn evaluate_option(
    option: &DialogueOption,
    character: &Combatant,
    roller: &mut impl DiceRoller,
    rules: &RelationshipRules,
) -> OptionOutcome {
    let check = option
        .kind
        .is_check()
        .then(|| roll_check(option, character, roller));
    let success = check.as_ref().is_some_and(|c| c.success);

    let (category, relationship_delta) = match option.kind {
        OptionKind::Normal => (ResponseCategory::Neutral, 0),
        OptionKind::Romance => (ResponseCategory::Positive, rules.romance_bonus),
        OptionKind::Skill | OptionKind::Persuasion if success => {
            (ResponseCategory::Positive, rules.check_success_bonus)
        }
        OptionKind::Skill | OptionKind::Persuasion => (ResponseCategory::SkillFailure, 0),
        OptionKind::Intimidation if success => (ResponseCategory::IntimidationSuccess, 0),
        OptionKind::Intimidation => (
            ResponseCategory::IntimidationFailure,
            -rules.intimidation_penalty,
        ),
    };

    OptionOutcome {
        check,
        category,
        relationship_delta,
    }
}

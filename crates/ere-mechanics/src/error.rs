//! Error types for the mechanics engine.

use ere_core::CombatantId;

/// Errors that can occur during mechanics operations.
///
/// None of these are fatal: a rejected request leaves the encounter exactly
/// as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A dice expression did not match `NdS` or `NdS+B`.
    #[error("invalid dice expression: {0:?}")]
    InvalidExpression(String),

    /// A dice expression asks for more dice than one roll allows.
    #[error("too many dice: {count} (at most {max})")]
    TooManyDice {
        /// Dice requested.
        count: u32,
        /// Allowed maximum.
        max: u32,
    },

    /// No action template with this id exists.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The active combatant is not player-controlled.
    #[error("not the party's turn")]
    NotPlayerTurn,

    /// The encounter has already ended.
    #[error("encounter has ended")]
    EncounterEnded,

    /// The action needs a target and none was given.
    #[error("action '{0}' requires a target")]
    MissingTarget(String),

    /// The target does not exist on the opposing side.
    #[error("unknown target: {0}")]
    UnknownTarget(CombatantId),

    /// The target is at 0 hit points.
    #[error("target is incapacitated: {0}")]
    TargetIncapacitated(CombatantId),

    /// No participant is currently active.
    #[error("no active participant")]
    NoActiveParticipant,

    /// A roster operation failed.
    #[error(transparent)]
    Roster(#[from] ere_core::CoreError),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;

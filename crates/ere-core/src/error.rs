use crate::combatant::CombatantId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating rosters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The requested combatant is not a member of the roster.
    #[error("combatant not found: {0}")]
    CombatantNotFound(CombatantId),

    /// A combatant with the same id is already a member.
    #[error("combatant already in roster: {0}")]
    DuplicateCombatant(CombatantId),

    /// The party cannot take another member.
    #[error("party is full ({max} members)")]
    PartyFull {
        /// The maximum party size.
        max: usize,
    },
}

//! Core types for the encounter engine: combatants, rosters, and relationships.
//!
//! This crate defines the party/enemy data model that both the combat and the
//! dialogue engines consume. It has no notion of dice or turns; it only knows
//! how a combatant's stats, hit points, and relationship score are shaped and
//! which invariants they keep.

/// Ability scores and the ability modifier formula.
pub mod ability;
/// Combatant identity, allegiance, and stat block.
pub mod combatant;
/// Error types used throughout the crate.
pub mod error;
/// Bounded relationship scores for companions.
pub mod relationship;
/// Copy-on-write collections of combatants.
pub mod roster;

/// Re-export ability types.
pub use ability::{Ability, AbilityScores, modifier};
/// Re-export combatant types.
pub use combatant::{Allegiance, Combatant, CombatantId};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export relationship types.
pub use relationship::{Relationship, RelationshipTier};
/// Re-export roster types.
pub use roster::{MAX_PARTY_SIZE, Roster};

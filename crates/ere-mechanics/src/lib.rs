//! Encounter mechanics: dice, turn order, action resolution, and combat.
//!
//! Provides a dice engine for `NdS+B` expressions, a virtual-clock
//! scheduler for delayed and cancelable engine callbacks, an initiative
//! turn order, pure action resolvers, and the [`Encounter`] state machine
//! that drives a fight from the first initiative roll to victory, defeat,
//! or abandonment.

pub mod combat;
pub mod config;
pub mod dice;
pub mod error;
pub mod preset;
pub mod schedule;

pub use combat::{
    Action, ActionKind, CombatLog, CombatOutcome, CombatPhase, CombatSnapshot, CombatUpdate,
    Encounter, TurnEntry, TurnOrder,
};
pub use config::EncounterConfig;
pub use dice::{DiceExpression, DiceRoller, ExpressionRoll, FixedRolls};
pub use error::{MechError, MechResult};
pub use schedule::{Scheduler, SessionId, TaskHandle};

//! Turn-based combat encounters.
//!
//! An [`Encounter`] owns the turn order, the combat log and the current
//! party and enemy snapshots. The host feeds it player actions and elapsed
//! time; enemies act on their own after a short delay and the encounter
//! checks for victory or defeat after every change.

pub mod action;
pub mod log;
pub mod order;
pub mod resolve;

pub use action::{Action, ActionKind};
pub use log::CombatLog;
pub use order::{TurnEntry, TurnOrder};
pub use resolve::{AttackRoll, Effect, Resolution};

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use ere_core::{Allegiance, Combatant, CombatantId, Roster};

use crate::config::EncounterConfig;
use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::schedule::{Scheduler, SessionId};

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    /// Every enemy is incapacitated.
    Victory,
    /// Every party member is incapacitated.
    Defeat,
    /// The host tore the encounter down.
    Abandoned,
}

impl fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Where the encounter's state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    /// Waiting for the host to send the active ally's action.
    AwaitingPlayer,
    /// An enemy turn is scheduled.
    AwaitingEnemy,
    /// An action is being applied.
    Resolving,
    /// The encounter is over.
    Ended(CombatOutcome),
}

/// Everything a host needs to render the encounter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatSnapshot {
    /// Full combat log.
    pub log: Vec<String>,
    /// Current party snapshot.
    pub party: Roster,
    /// Current enemy snapshot.
    pub enemies: Roster,
    /// Combatant whose turn it is, if the encounter is still running.
    pub active: Option<CombatantId>,
    /// Current phase.
    pub phase: CombatPhase,
    /// Turns taken so far.
    pub turn_index: usize,
}

/// A notification emitted by the encounter.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatUpdate {
    /// State changed.
    Snapshot(CombatSnapshot),
    /// The encounter finished; the host should leave combat mode.
    Ended(CombatOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombatTask {
    EnemyTurn { turn: usize },
    SignalEnd,
}

/// A running combat encounter.
#[derive(Debug)]
pub struct Encounter<R = StdRng> {
    session: SessionId,
    config: EncounterConfig,
    party: Roster,
    enemies: Roster,
    order: TurnOrder,
    turn: usize,
    phase: CombatPhase,
    log: CombatLog,
    defending: HashSet<CombatantId>,
    scheduler: Scheduler<CombatTask>,
    roller: R,
    actions: Vec<Action>,
}

impl Encounter<StdRng> {
    /// Start an encounter, seeding the dice from the config or the OS.
    pub fn start(party: Roster, enemies: Roster, config: EncounterConfig) -> (Self, Vec<CombatUpdate>) {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::start_with_roller(party, enemies, config, rng)
    }
}

impl<R: DiceRoller> Encounter<R> {
    /// Start an encounter with an explicit dice roller.
    pub fn start_with_roller(
        party: Roster,
        enemies: Roster,
        config: EncounterConfig,
        mut roller: R,
    ) -> (Self, Vec<CombatUpdate>) {
        let session = SessionId::new();
        let (order, party) = TurnOrder::build(&party, &enemies, &mut roller);
        let mut log = CombatLog::new();
        log.push("Combat begins!");
        tracing::info!(%session, party = party.len(), enemies = enemies.len(), "combat started");

        let mut encounter = Self {
            session,
            config,
            party,
            enemies,
            order,
            turn: 0,
            phase: CombatPhase::Resolving,
            log,
            defending: HashSet::new(),
            scheduler: Scheduler::new(session),
            roller,
            actions: Action::standard_set(),
        };
        encounter.after_mutation();
        let updates = vec![CombatUpdate::Snapshot(encounter.snapshot())];
        (encounter, updates)
    }

    /// Resolve the active ally's action.
    ///
    /// Rejected requests leave the encounter untouched and return an error.
    pub fn send_action(
        &mut self,
        action_id: &str,
        target: Option<&CombatantId>,
    ) -> MechResult<Vec<CombatUpdate>> {
        let (action, target) = match self.validate_action(action_id, target) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!(session = %self.session, action = action_id, error = %e, "action rejected");
                return Err(e);
            }
        };
        let actor_id = self.active_id().ok_or(MechError::NoActiveParticipant)?;

        let resolution = {
            let actor = self
                .party
                .get(&actor_id)
                .ok_or_else(|| MechError::UnknownTarget(actor_id.clone()))?;
            let target = target.as_ref().and_then(|id| self.enemies.get(id));
            match (action.kind, target) {
                (ActionKind::Attack, Some(t)) => {
                    let ac = self.effective_ac(t);
                    resolve::resolve_attack(actor, t, &action, ac, &mut self.roller)
                }
                (ActionKind::Spell, Some(t)) => {
                    resolve::resolve_spell(actor, t, &action, &mut self.roller)
                }
                (ActionKind::Defend, _) => resolve::resolve_defend(actor, self.config.defend_bonus),
                (ActionKind::Item, _) => resolve::resolve_item(actor, &action, &mut self.roller),
                (_, None) => return Err(MechError::MissingTarget(action.id.clone())),
            }
        };
        tracing::debug!(session = %self.session, actor = %actor_id, action = %action.id, "player action resolved");
        self.phase = CombatPhase::Resolving;
        self.apply(resolution);
        self.turn = order::advance(self.turn);
        self.after_mutation();
        Ok(vec![CombatUpdate::Snapshot(self.snapshot())])
    }

    /// Move the encounter clock forward, running any enemy turns and end
    /// signals that become due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<CombatUpdate> {
        let until = self.scheduler.now() + elapsed;
        let mut updates = Vec::new();
        while let Some(task) = self.scheduler.next_ready(until) {
            match task {
                CombatTask::EnemyTurn { turn } => {
                    if self.phase != CombatPhase::AwaitingEnemy || turn != self.turn {
                        tracing::trace!(session = %self.session, turn, "stale enemy turn skipped");
                        continue;
                    }
                    self.enemy_turn();
                    updates.push(CombatUpdate::Snapshot(self.snapshot()));
                }
                CombatTask::SignalEnd => {
                    if let CombatPhase::Ended(outcome) = self.phase {
                        updates.push(CombatUpdate::Ended(outcome));
                    }
                }
            }
        }
        self.scheduler.settle(until);
        updates
    }

    /// End the encounter immediately without deciding a winner.
    pub fn abandon(&mut self) -> Vec<CombatUpdate> {
        if self.is_ended() {
            return Vec::new();
        }
        self.phase = CombatPhase::Ended(CombatOutcome::Abandoned);
        self.scheduler.invalidate();
        tracing::info!(session = %self.session, "combat abandoned");
        vec![CombatUpdate::Ended(CombatOutcome::Abandoned)]
    }

    /// Hand the encounter a new party snapshot from the world controller.
    ///
    /// The turn order is rebuilt only if the party's membership changed.
    /// Allies revived since the order was built get a slot of their own.
    pub fn replace_party(&mut self, party: Roster) -> MechResult<Vec<CombatUpdate>> {
        if self.is_ended() {
            return Err(MechError::EncounterEnded);
        }
        let active_before = self.active_id();
        let reordered = if self.order.matches_shape(&party, &self.enemies) {
            self.party = party;
            self.admit_revived()
        } else {
            let (order, rolled) = TurnOrder::build(&party, &self.enemies, &mut self.roller);
            tracing::debug!(session = %self.session, slots = order.len(), "turn order rebuilt");
            self.order = order;
            self.party = rolled;
            self.turn = 0;
            true
        };
        let party_ids: HashSet<CombatantId> = self.party.ids().into_iter().collect();
        self.defending
            .retain(|id| party_ids.contains(id) || self.enemies.contains(id));

        if self.check_termination() {
            return Ok(vec![CombatUpdate::Snapshot(self.snapshot())]);
        }
        // a reordered turn index orphans any pending enemy task
        let still_valid = !reordered
            && active_before
                .as_ref()
                .is_some_and(|id| self.active_id().as_ref() == Some(id) && self.is_living(id));
        if !still_valid {
            self.scheduler.invalidate();
            self.settle_turn();
        }
        Ok(vec![CombatUpdate::Snapshot(self.snapshot())])
    }

    /// Current state as a snapshot.
    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            log: self.log.entries().to_vec(),
            party: self.party.clone(),
            enemies: self.enemies.clone(),
            active: if self.is_ended() { None } else { self.active_id() },
            phase: self.phase,
            turn_index: self.turn,
        }
    }

    /// Session identifier.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current phase.
    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Returns true once the encounter has ended.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, CombatPhase::Ended(_))
    }

    /// Current party snapshot.
    pub fn party(&self) -> &Roster {
        &self.party
    }

    /// Current enemy snapshot.
    pub fn enemies(&self) -> &Roster {
        &self.enemies
    }

    /// The combat log.
    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// The turn order.
    pub fn order(&self) -> &TurnOrder {
        &self.order
    }

    /// Turns taken so far.
    pub fn turn_index(&self) -> usize {
        self.turn
    }

    /// Actions offered to the party.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The combatant whose turn it is.
    pub fn active_actor(&self) -> Option<&Combatant> {
        if self.is_ended() {
            return None;
        }
        let entry = self.order.current(self.turn)?;
        self.roster_for(entry.allegiance).get(&entry.id)
    }

    /// Enemies that may be targeted right now.
    pub fn valid_targets(&self) -> Vec<CombatantId> {
        self.enemies.living().into_iter().map(|c| c.id.clone()).collect()
    }

    /// Returns true if the combatant is currently braced by a defend action.
    pub fn is_defending(&self, id: &CombatantId) -> bool {
        self.defending.contains(id)
    }

    /// Time until the next scheduled event, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    fn validate_action(
        &self,
        action_id: &str,
        target: Option<&CombatantId>,
    ) -> MechResult<(Action, Option<CombatantId>)> {
        match self.phase {
            CombatPhase::Ended(_) => return Err(MechError::EncounterEnded),
            CombatPhase::AwaitingPlayer => {}
            _ => return Err(MechError::NotPlayerTurn),
        }
        let action = self
            .actions
            .iter()
            .find(|a| a.id == action_id)
            .cloned()
            .ok_or_else(|| MechError::UnknownAction(action_id.to_string()))?;
        if !action.kind.requires_target() {
            return Ok((action, None));
        }
        let target = target.ok_or_else(|| MechError::MissingTarget(action.id.clone()))?;
        let enemy = self
            .enemies
            .get(target)
            .ok_or_else(|| MechError::UnknownTarget(target.clone()))?;
        if enemy.is_incapacitated() {
            return Err(MechError::TargetIncapacitated(target.clone()));
        }
        Ok((action, Some(target.clone())))
    }

    /// Slot in living allies the order has no entry for, keeping the
    /// active combatant's turn. Returns true if any ally was admitted.
    fn admit_revived(&mut self) -> bool {
        let revived: Vec<Combatant> = self
            .party
            .iter()
            .filter(|c| c.is_alive() && !self.order.has_slot(&c.id))
            .cloned()
            .collect();
        if revived.is_empty() {
            return false;
        }
        let active = self.active_id();
        for member in &revived {
            let initiative = self.order.admit(member, &mut self.roller);
            if let Ok(next) = self.party.update(&member.id, |c| c.initiative = initiative) {
                self.party = next;
            }
            tracing::debug!(session = %self.session, id = %member.id, initiative, "ally admitted to turn order");
        }
        if let Some(at) = active.and_then(|id| self.order.position(&id)) {
            self.turn = at;
        }
        true
    }

    fn enemy_turn(&mut self) {
        let Some(actor_id) = self.active_id() else {
            return;
        };
        let resolution = {
            let Some(actor) = self.enemies.get(&actor_id) else {
                return;
            };
            let living = self.party.living();
            if living.is_empty() {
                return;
            }
            let target = living[self.roller.pick_index(living.len()).min(living.len() - 1)];
            let ac = self.effective_ac(target);
            let action = Action::basic_attack(actor.attack_damage.clone());
            resolve::resolve_attack(actor, target, &action, ac, &mut self.roller)
        };
        tracing::debug!(session = %self.session, actor = %actor_id, "enemy turn resolved");
        self.phase = CombatPhase::Resolving;
        self.apply(resolution);
        self.turn = order::advance(self.turn);
        self.after_mutation();
    }

    fn effective_ac(&self, target: &Combatant) -> i32 {
        if self.defending.contains(&target.id) {
            target.armor_class + self.config.defend_bonus
        } else {
            target.armor_class
        }
    }

    fn apply(&mut self, resolution: Resolution) {
        self.log.extend(resolution.lines);
        match resolution.effect {
            Effect::Damage { target, amount } => {
                let side = if self.enemies.contains(&target) {
                    Allegiance::Enemy
                } else {
                    Allegiance::Ally
                };
                let roster = self.roster_for(side);
                let was_alive = roster.get(&target).is_some_and(Combatant::is_alive);
                let Ok(next) = roster.update(&target, |c| {
                    c.take_damage(amount);
                }) else {
                    return;
                };
                if let Some(c) = next
                    .get(&target)
                    .filter(|c| was_alive && c.is_incapacitated())
                {
                    self.log.push(format!("{} falls!", c.name));
                }
                match side {
                    Allegiance::Enemy => self.enemies = next,
                    Allegiance::Ally => self.party = next,
                }
            }
            Effect::Heal { target, amount } => {
                if let Ok(next) = self.party.update(&target, |c| {
                    c.heal(amount);
                }) {
                    self.party = next;
                }
            }
            Effect::Defend { actor } => {
                self.defending.insert(actor);
            }
            Effect::None => {}
        }
    }

    /// Check for the end of combat, otherwise hand the turn to the next
    /// living combatant.
    fn after_mutation(&mut self) {
        if !self.check_termination() {
            self.settle_turn();
        }
    }

    fn check_termination(&mut self) -> bool {
        let outcome = if self.enemies.all_incapacitated() {
            self.log.push("Victory! All enemies have been defeated!");
            CombatOutcome::Victory
        } else if self.party.all_incapacitated() {
            self.log.push("Defeat! The whole party has fallen!");
            CombatOutcome::Defeat
        } else {
            return false;
        };
        self.phase = CombatPhase::Ended(outcome);
        self.scheduler.invalidate();
        self.scheduler
            .schedule(self.config.end_signal_delay(), CombatTask::SignalEnd);
        tracing::info!(session = %self.session, %outcome, turns = self.turn, "combat ended");
        true
    }

    fn settle_turn(&mut self) {
        let slots = self.order.len();
        for _ in 0..slots {
            let Some(entry) = self.order.current(self.turn).cloned() else {
                break;
            };
            if !self.is_living(&entry.id) {
                self.turn = order::advance(self.turn);
                continue;
            }
            self.defending.remove(&entry.id);
            self.phase = match entry.allegiance {
                Allegiance::Ally => CombatPhase::AwaitingPlayer,
                Allegiance::Enemy => {
                    self.scheduler.schedule(
                        self.config.enemy_turn_delay(),
                        CombatTask::EnemyTurn { turn: self.turn },
                    );
                    CombatPhase::AwaitingEnemy
                }
            };
            tracing::debug!(session = %self.session, actor = %entry.id, phase = ?self.phase, "turn started");
            return;
        }
        tracing::warn!(session = %self.session, "no living combatant in turn order");
    }

    fn active_id(&self) -> Option<CombatantId> {
        self.order.current(self.turn).map(|e| e.id.clone())
    }

    fn is_living(&self, id: &CombatantId) -> bool {
        self.party
            .get(id)
            .or_else(|| self.enemies.get(id))
            .is_some_and(Combatant::is_alive)
    }

    fn roster_for(&self, side: Allegiance) -> &Roster {
        match side {
            Allegiance::Ally => &self.party,
            Allegiance::Enemy => &self.enemies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRolls;
    use ere_core::AbilityScores;

    fn tav(hp: i32) -> Combatant {
        Combatant::ally("tav", "Tav", hp, AbilityScores::new(15, 14, 13, 12, 10, 8)).as_player()
    }

    fn goblins() -> Roster {
        Roster::new(vec![
            Combatant::enemy("goblin1", "Goblin Warrior", 15, 13, "1d6+2", 12),
            Combatant::enemy("goblin2", "Goblin Archer", 12, 14, "1d6+1", 15),
        ])
    }

    fn start(party: Vec<Combatant>, rolls: Vec<u32>) -> Encounter<FixedRolls> {
        let (enc, updates) = Encounter::start_with_roller(
            Roster::new(party),
            goblins(),
            EncounterConfig::default(),
            FixedRolls::new(rolls),
        );
        assert_eq!(updates.len(), 1);
        enc
    }

    fn goblin1() -> CombatantId {
        "goblin1".into()
    }

    fn goblin2() -> CombatantId {
        "goblin2".into()
    }

    #[test]
    fn start_logs_and_awaits_fastest_actor() {
        let enc = start(vec![tav(10)], vec![20]);
        assert_eq!(enc.log().entries(), ["Combat begins!"]);
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);
        assert_eq!(enc.active_actor().unwrap().name, "Tav");
        assert_eq!(enc.party().get(&"tav".into()).unwrap().initiative, 22);
        assert_eq!(enc.order().initiatives(), vec![22, 15, 12]);
    }

    #[test]
    fn enemy_first_waits_for_delay() {
        let mut enc = start(vec![tav(30)], vec![1]);
        assert_eq!(enc.phase(), CombatPhase::AwaitingEnemy);
        assert_eq!(enc.active_actor().unwrap().id, goblin2());
        assert_eq!(enc.time_until_next(), Some(Duration::from_millis(1500)));
        assert!(enc.advance(Duration::from_millis(1499)).is_empty());
        let updates = enc.advance(Duration::from_millis(1));
        assert_eq!(updates.len(), 1);
        assert_eq!(enc.turn_index(), 1);
    }

    #[test]
    fn full_fight_ends_in_victory() {
        // every die rolls its maximum
        let mut enc = start(vec![tav(30)], vec![20]);

        enc.send_action("weapon_attack", Some(&goblin1())).unwrap();
        assert_eq!(enc.enemies().get(&goblin1()).unwrap().hp(), 4);
        assert_eq!(enc.phase(), CombatPhase::AwaitingEnemy);

        let updates = enc.advance(Duration::from_secs(10));
        assert_eq!(updates.len(), 2);
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 15);
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);

        enc.send_action("weapon_attack", Some(&goblin1())).unwrap();
        assert!(enc.log().entries().contains(&"Goblin Warrior falls!".to_string()));
        enc.advance(Duration::from_secs(10));
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 8);

        // the fallen warrior's slot is skipped
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);
        assert_eq!(
            enc.send_action("weapon_attack", Some(&goblin1())),
            Err(MechError::TargetIncapacitated(goblin1()))
        );
        enc.send_action("weapon_attack", Some(&goblin2())).unwrap();
        enc.advance(Duration::from_secs(10));
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 1);

        let updates = enc.send_action("weapon_attack", Some(&goblin2())).unwrap();
        assert_eq!(enc.phase(), CombatPhase::Ended(CombatOutcome::Victory));
        match &updates[0] {
            CombatUpdate::Snapshot(s) => assert!(s.active.is_none()),
            other => panic!("unexpected update {other:?}"),
        }
        assert_eq!(
            enc.log().last(),
            Some("Victory! All enemies have been defeated!")
        );

        assert!(enc.advance(Duration::from_millis(1999)).is_empty());
        assert_eq!(
            enc.advance(Duration::from_millis(1)),
            vec![CombatUpdate::Ended(CombatOutcome::Victory)]
        );
    }

    #[test]
    fn party_wipe_ends_in_defeat() {
        let mut enc = start(vec![tav(1)], vec![20]);
        enc.send_action("defend", None).unwrap();
        let updates = enc.advance(Duration::from_secs(5));
        assert_eq!(enc.phase(), CombatPhase::Ended(CombatOutcome::Defeat));
        assert!(enc.log().entries().contains(&"Tav falls!".to_string()));
        assert_eq!(enc.log().last(), Some("Defeat! The whole party has fallen!"));
        // the snapshot plus the end signal at 1500 + 2000 ms
        assert!(updates.contains(&CombatUpdate::Ended(CombatOutcome::Defeat)));
    }

    #[test]
    fn defend_raises_ac_until_next_turn() {
        // initiative 20; archer picks tav and rolls 11 (+2 = 13), warrior rolls 1
        let mut enc = start(vec![tav(10)], vec![20, 1, 11]);
        enc.send_action("defend", None).unwrap();
        assert!(enc.is_defending(&"tav".into()));
        assert_eq!(
            enc.log().last(),
            Some("Tav takes a defensive stance (+2 AC)")
        );
        enc.advance(Duration::from_secs(10));
        assert!(
            enc.log()
                .entries()
                .contains(&"Goblin Archer attacks Tav: 11+2=13 (miss!)".to_string())
        );
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 10);
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);
        assert!(!enc.is_defending(&"tav".into()));
    }

    #[test]
    fn rejected_actions_leave_state_untouched() {
        let mut enc = start(vec![tav(10)], vec![20]);
        let before = enc.snapshot();

        assert_eq!(
            enc.send_action("fireball", None),
            Err(MechError::UnknownAction("fireball".into()))
        );
        assert_eq!(
            enc.send_action("weapon_attack", None),
            Err(MechError::MissingTarget("weapon_attack".into()))
        );
        assert_eq!(
            enc.send_action("magic_missile", Some(&"tav".into())),
            Err(MechError::UnknownTarget("tav".into()))
        );
        assert_eq!(enc.snapshot(), before);
    }

    #[test]
    fn acting_out_of_turn_is_rejected() {
        let mut enc = start(vec![tav(30)], vec![1]);
        let before = enc.log().len();
        assert_eq!(
            enc.send_action("defend", None),
            Err(MechError::NotPlayerTurn)
        );
        assert_eq!(enc.log().len(), before);
    }

    #[test]
    fn spell_can_end_combat_immediately() {
        let enemies = Roster::new(vec![Combatant::enemy("rat", "Rat", 2, 10, "1d2", 1)]);
        let (mut enc, _) = Encounter::start_with_roller(
            Roster::new(vec![tav(10)]),
            enemies,
            EncounterConfig::default(),
            FixedRolls::new(vec![20]),
        );
        enc.send_action("magic_missile", Some(&"rat".into())).unwrap();
        assert_eq!(enc.phase(), CombatPhase::Ended(CombatOutcome::Victory));
        assert_eq!(
            enc.send_action("defend", None),
            Err(MechError::EncounterEnded)
        );
    }

    #[test]
    fn potion_heals_and_passes_the_turn() {
        let mut enc = start(vec![tav(10).with_hp(8)], vec![20]);
        enc.send_action("healing_potion", None).unwrap();
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 10);
        assert_eq!(
            enc.log().last(),
            Some("Tav drinks a healing potion and restores 2 HP")
        );
        assert_eq!(enc.turn_index(), 1);
    }

    #[test]
    fn abandon_invalidates_pending_enemy_turn() {
        let mut enc = start(vec![tav(30)], vec![1]);
        assert_eq!(enc.phase(), CombatPhase::AwaitingEnemy);
        let log_len = enc.log().len();
        assert_eq!(
            enc.abandon(),
            vec![CombatUpdate::Ended(CombatOutcome::Abandoned)]
        );
        assert!(enc.advance(Duration::from_secs(60)).is_empty());
        assert_eq!(enc.log().len(), log_len);
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 30);
        assert!(enc.abandon().is_empty());
    }

    #[test]
    fn incapacitated_allies_are_never_targeted() {
        let party = vec![
            tav(30),
            Combatant::ally("gale", "Gale", 6, AbilityScores::default()).with_hp(0),
        ];
        let mut enc = start(party, vec![1]);
        enc.advance(Duration::from_secs(10));
        assert_eq!(enc.party().get(&"gale".into()).unwrap().hp(), 0);
        assert!(
            enc.log()
                .entries()
                .iter()
                .filter(|l| l.contains("attacks"))
                .all(|l| l.contains("attacks Tav"))
        );
    }

    #[test]
    fn replace_party_keeps_order_when_shape_unchanged() {
        let mut enc = start(vec![tav(10)], vec![20]);
        let hurt = enc
            .party()
            .update(&"tav".into(), |c| c.set_hp(5))
            .unwrap();
        let order = enc.order().clone();
        enc.replace_party(hurt).unwrap();
        assert_eq!(enc.order(), &order);
        assert_eq!(enc.party().get(&"tav".into()).unwrap().hp(), 5);
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);
    }

    #[test]
    fn replace_party_rebuilds_on_new_member() {
        let mut enc = start(vec![tav(10)], vec![20]);
        let grown = enc
            .party()
            .join(Combatant::ally("gale", "Gale", 6, AbilityScores::default()))
            .unwrap();
        enc.replace_party(grown).unwrap();
        assert_eq!(enc.order().len(), 4);
        assert_eq!(enc.turn_index(), 0);
    }

    #[test]
    fn replace_party_rebuild_keeps_enemy_turn_scheduled() {
        // tav 22 defends, then the newly built order puts the archer first again
        let mut enc = start(vec![tav(30)], vec![20, 1, 1]);
        enc.send_action("defend", None).unwrap();
        assert_eq!(enc.active_actor().unwrap().id, goblin2());

        let grown = enc
            .party()
            .join(Combatant::ally("gale", "Gale", 6, AbilityScores::default()))
            .unwrap();
        enc.replace_party(grown).unwrap();
        assert_eq!(enc.turn_index(), 0);
        assert_eq!(enc.active_actor().unwrap().id, goblin2());
        assert_eq!(enc.phase(), CombatPhase::AwaitingEnemy);
        assert_eq!(enc.time_until_next(), Some(Duration::from_millis(1500)));

        let updates = enc.advance(Duration::from_millis(1500));
        assert_eq!(updates.len(), 1);
        assert_eq!(enc.turn_index(), 1);
        assert!(
            enc.log()
                .entries()
                .iter()
                .any(|l| l.starts_with("Goblin Archer attacks"))
        );
    }

    #[test]
    fn replace_party_admits_revived_ally() {
        let party = vec![
            tav(10),
            Combatant::ally("gale", "Gale", 6, AbilityScores::default()).with_hp(0),
        ];
        let mut enc = start(party, vec![20]);
        assert_eq!(enc.order().len(), 3);

        let healed = enc
            .party()
            .update(&"gale".into(), |c| c.set_hp(6))
            .unwrap();
        enc.replace_party(healed).unwrap();
        // gale: 20 + 0 = 20, right behind tav at 22
        assert_eq!(enc.order().initiatives(), vec![22, 20, 15, 12]);
        assert_eq!(enc.party().get(&"gale".into()).unwrap().initiative, 20);
        assert_eq!(enc.active_actor().unwrap().name, "Tav");
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);

        enc.send_action("defend", None).unwrap();
        assert_eq!(enc.active_actor().unwrap().name, "Gale");
        assert_eq!(enc.phase(), CombatPhase::AwaitingPlayer);
    }

    #[test]
    fn seeded_encounters_are_reproducible() {
        let run = || {
            let (mut enc, _) = Encounter::start(
                Roster::new(vec![tav(12)]),
                goblins(),
                EncounterConfig::default().with_seed(99),
            );
            while !enc.is_ended() {
                if enc.phase() == CombatPhase::AwaitingPlayer {
                    let target = enc.valid_targets()[0].clone();
                    enc.send_action("weapon_attack", Some(&target)).unwrap();
                } else {
                    enc.advance(Duration::from_secs(2));
                }
            }
            enc.log().entries().to_vec()
        };
        let first = run();
        assert_eq!(first, run());
        let last = first.last().unwrap();
        assert!(last.starts_with("Victory!") || last.starts_with("Defeat!"));
    }
}

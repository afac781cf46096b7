//! Initiative turn order.
//!
//! The order is built once per encounter and cycles forever: the active
//! entry is `entries[turn_index % len]`. Incapacitated combatants keep their
//! slot; the controller skips them when handing out turns.

use serde::{Deserialize, Serialize};

use ere_core::{Ability, Allegiance, Combatant, CombatantId, Roster};

use crate::dice::DiceRoller;

/// One slot in the turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    /// Combatant in this slot.
    pub id: CombatantId,
    /// Which roster the combatant lives in.
    pub allegiance: Allegiance,
    /// Initiative the slot was sorted by.
    pub initiative: i32,
}

/// A cyclic initiative order over both sides of an encounter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    entries: Vec<TurnEntry>,
    party_shape: Vec<CombatantId>,
    enemy_shape: Vec<CombatantId>,
}

impl TurnOrder {
    /// Roll initiative for the living party and merge it with the enemies'
    /// precomputed initiative.
    ///
    /// Returns the order together with a party snapshot carrying the rolled
    /// initiative values.
    pub fn build(party: &Roster, enemies: &Roster, roller: &mut impl DiceRoller) -> (Self, Roster) {
        let mut rolled = party.clone();
        let mut entries = Vec::with_capacity(party.len() + enemies.len());

        for member in party.iter().filter(|c| c.is_alive()) {
            let initiative = roll_initiative(member, roller);
            if let Ok(next) = rolled.update(&member.id, |c| c.initiative = initiative) {
                rolled = next;
            }
            entries.push(TurnEntry {
                id: member.id.clone(),
                allegiance: Allegiance::Ally,
                initiative,
            });
        }

        entries.extend(enemies.iter().map(|enemy| TurnEntry {
            id: enemy.id.clone(),
            allegiance: Allegiance::Enemy,
            initiative: enemy.initiative,
        }));

        // sort_by is stable: ties keep allies before enemies, roster order within a side
        entries.sort_by(|a, b| b.initiative.cmp(&a.initiative));

        let order = Self {
            entries,
            party_shape: party.ids(),
            enemy_shape: enemies.ids(),
        };
        (order, rolled)
    }

    /// Build an order from explicit entries, sorting them by initiative.
    pub fn from_entries(mut entries: Vec<TurnEntry>) -> Self {
        entries.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        let shape = |side: Allegiance| {
            entries
                .iter()
                .filter(|e| e.allegiance == side)
                .map(|e| e.id.clone())
                .collect()
        };
        let party_shape = shape(Allegiance::Ally);
        let enemy_shape = shape(Allegiance::Enemy);
        Self {
            entries,
            party_shape,
            enemy_shape,
        }
    }

    /// Give a living ally without a slot (it was down when the order was
    /// built) a place in the order and return its rolled initiative.
    ///
    /// The newcomer goes after every slot with higher initiative and after
    /// allies it ties with, matching where a full build would have put it.
    pub fn admit(&mut self, member: &Combatant, roller: &mut impl DiceRoller) -> i32 {
        let initiative = roll_initiative(member, roller);
        let at = self
            .entries
            .iter()
            .position(|e| {
                e.initiative < initiative
                    || (e.initiative == initiative && e.allegiance == Allegiance::Enemy)
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            TurnEntry {
                id: member.id.clone(),
                allegiance: Allegiance::Ally,
                initiative,
            },
        );
        initiative
    }

    /// Returns true if `id` holds a slot.
    pub fn has_slot(&self, id: &CombatantId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Slot index of `id`.
    pub fn position(&self, id: &CombatantId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// The entry whose turn it is at `turn_index`.
    pub fn current(&self, turn_index: usize) -> Option<&TurnEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get(turn_index % self.entries.len())
    }

    /// All entries in acting order.
    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    /// Initiative values in acting order.
    pub fn initiatives(&self) -> Vec<i32> {
        self.entries.iter().map(|e| e.initiative).collect()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the order has no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the rosters still have the shape this order was built for.
    ///
    /// Hit point changes never alter the shape; joining, leaving, or
    /// reordering members does.
    pub fn matches_shape(&self, party: &Roster, enemies: &Roster) -> bool {
        self.party_shape == party.ids() && self.enemy_shape == enemies.ids()
    }
}

fn roll_initiative(member: &Combatant, roller: &mut impl DiceRoller) -> i32 {
    let roll = i32::try_from(roller.roll_d20()).unwrap_or(1);
    let initiative = roll + member.abilities.modifier(Ability::Dexterity);
    tracing::trace!(id = %member.id, roll, initiative, "initiative rolled");
    initiative
}

/// The turn index after `turn_index`.
pub fn advance(turn_index: usize) -> usize {
    turn_index.wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRolls;
    use ere_core::AbilityScores;

    fn party() -> Roster {
        Roster::new(vec![
            Combatant::ally("tav", "Tav", 10, AbilityScores::new(15, 14, 13, 12, 10, 8)),
            Combatant::ally("astarion", "Astarion", 8, AbilityScores::new(8, 17, 14, 13, 13, 10)),
        ])
    }

    fn enemies() -> Roster {
        Roster::new(vec![
            Combatant::enemy("goblin1", "Goblin Warrior", 15, 13, "1d6+2", 12),
            Combatant::enemy("goblin2", "Goblin Archer", 12, 14, "1d6+1", 15),
        ])
    }

    #[test]
    fn build_sorts_descending() {
        // tav: 6 + 2 = 8, astarion: 17 + 3 = 20
        let mut rolls = FixedRolls::new(vec![6, 17]);
        let (order, rolled) = TurnOrder::build(&party(), &enemies(), &mut rolls);
        assert_eq!(order.initiatives(), vec![20, 15, 12, 8]);
        let ids: Vec<&str> = order.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["astarion", "goblin2", "goblin1", "tav"]);
        assert_eq!(rolled.get(&"tav".into()).unwrap().initiative, 8);
        assert_eq!(rolled.get(&"astarion".into()).unwrap().initiative, 20);
    }

    #[test]
    fn order_is_non_increasing_for_given_initiatives() {
        let entries = [12, 15, 8, 20]
            .iter()
            .enumerate()
            .map(|(i, init)| TurnEntry {
                id: CombatantId::new(format!("c{i}")),
                allegiance: Allegiance::Enemy,
                initiative: *init,
            })
            .collect();
        let order = TurnOrder::from_entries(entries);
        let inits = order.initiatives();
        assert!(inits.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(inits, vec![20, 15, 12, 8]);
    }

    #[test]
    fn ties_keep_allies_first() {
        // tav: 10 + 2 = 12 ties goblin1
        let mut rolls = FixedRolls::new(vec![10, 1]);
        let (order, _) = TurnOrder::build(&party(), &enemies(), &mut rolls);
        let ids: Vec<&str> = order.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["goblin2", "tav", "goblin1", "astarion"]);
    }

    #[test]
    fn incapacitated_party_members_roll_no_initiative() {
        let party = party()
            .update(&"astarion".into(), |c| c.set_hp(0))
            .unwrap();
        let mut rolls = FixedRolls::new(vec![10]);
        let (order, _) = TurnOrder::build(&party, &enemies(), &mut rolls);
        assert_eq!(order.len(), 3);
        assert!(order.entries().iter().all(|e| e.id.as_str() != "astarion"));
        assert_eq!(rolls.consumed(), 1);
    }

    #[test]
    fn admit_slots_a_revived_ally_by_initiative() {
        let party = party()
            .update(&"astarion".into(), |c| c.set_hp(0))
            .unwrap();
        // tav: 10 + 2 = 12 ties goblin1 and goes first
        let mut rolls = FixedRolls::new(vec![10, 11]);
        let (mut order, _) = TurnOrder::build(&party, &enemies(), &mut rolls);
        assert!(!order.has_slot(&"astarion".into()));

        // astarion: 11 + 3 = 14
        let revived = party.get(&"astarion".into()).unwrap().clone().with_hp(8);
        assert_eq!(order.admit(&revived, &mut rolls), 14);
        let ids: Vec<&str> = order.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["goblin2", "astarion", "tav", "goblin1"]);
        assert_eq!(order.position(&"astarion".into()), Some(1));
        assert!(order.matches_shape(&party, &enemies()));
    }

    #[test]
    fn admit_ties_go_before_enemies() {
        let mut order = TurnOrder::from_entries(vec![TurnEntry {
            id: "goblin1".into(),
            allegiance: Allegiance::Enemy,
            initiative: 12,
        }]);
        let tav = Combatant::ally("tav", "Tav", 10, AbilityScores::new(15, 14, 13, 12, 10, 8));
        let mut rolls = FixedRolls::new(vec![10]);
        assert_eq!(order.admit(&tav, &mut rolls), 12);
        assert_eq!(order.entries()[0].id.as_str(), "tav");
    }

    #[test]
    fn current_wraps_around() {
        let mut rolls = FixedRolls::new(vec![6, 17]);
        let (order, _) = TurnOrder::build(&party(), &enemies(), &mut rolls);
        assert_eq!(order.current(0).unwrap().id.as_str(), "astarion");
        assert_eq!(order.current(4).unwrap().id.as_str(), "astarion");
        assert_eq!(order.current(7).unwrap().id.as_str(), "tav");
        assert_eq!(advance(7), 8);
    }

    #[test]
    fn empty_order_has_no_current() {
        let order = TurnOrder::default();
        assert!(order.current(0).is_none());
        assert!(order.is_empty());
    }

    #[test]
    fn shape_ignores_hit_points() {
        let mut rolls = FixedRolls::new(vec![10]);
        let party = party();
        let (order, _) = TurnOrder::build(&party, &enemies(), &mut rolls);
        let hurt = party.update(&"tav".into(), |c| c.set_hp(1)).unwrap();
        assert!(order.matches_shape(&hurt, &enemies()));
        let smaller = party.leave(&"tav".into()).unwrap();
        assert!(!order.matches_shape(&smaller, &enemies()));
    }
}

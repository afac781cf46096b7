use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combatant::{Allegiance, Combatant, CombatantId};
use crate::error::{CoreError, CoreResult};
use crate::relationship::Relationship;

/// Maximum number of members a party may hold.
pub const MAX_PARTY_SIZE: usize = 6;

/// An ordered, copy-on-write collection of combatants.
///
/// Cloning a roster is cheap and every mutating operation returns a new
/// snapshot, so a roster handed out earlier never changes underneath its
/// reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Combatant>", into = "Vec<Combatant>")]
pub struct Roster {
    members: Arc<Vec<Combatant>>,
}

impl Roster {
    /// Create a roster from a list of combatants.
    pub fn new(members: Vec<Combatant>) -> Self {
        Self {
            members: Arc::new(members),
        }
    }

    /// All members in order.
    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    /// Iterate over members.
    pub fn iter(&self) -> std::slice::Iter<'_, Combatant> {
        self.members.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Find a member by id.
    pub fn get(&self, id: &CombatantId) -> Option<&Combatant> {
        self.members.iter().find(|c| &c.id == id)
    }

    /// Returns true if a member with this id exists.
    pub fn contains(&self, id: &CombatantId) -> bool {
        self.get(id).is_some()
    }

    /// Ordered member ids. Two rosters with equal ids have the same shape.
    pub fn ids(&self) -> Vec<CombatantId> {
        self.members.iter().map(|c| c.id.clone()).collect()
    }

    /// Members that are not incapacitated.
    pub fn living(&self) -> Vec<&Combatant> {
        self.members.iter().filter(|c| c.is_alive()).collect()
    }

    /// Returns true if every member is incapacitated (vacuously true when empty).
    pub fn all_incapacitated(&self) -> bool {
        self.members.iter().all(Combatant::is_incapacitated)
    }

    /// Returns true if both rosters share the same underlying snapshot.
    pub fn same_snapshot(&self, other: &Roster) -> bool {
        Arc::ptr_eq(&self.members, &other.members)
    }

    /// Sum of current hit points.
    pub fn total_hp(&self) -> i32 {
        self.members.iter().map(Combatant::hp).sum()
    }

    /// Sum of maximum hit points.
    pub fn total_max_hp(&self) -> i32 {
        self.members.iter().map(Combatant::max_hp).sum()
    }

    /// Return a new snapshot with `f` applied to the member `id`.
    pub fn update<F>(&self, id: &CombatantId, f: F) -> CoreResult<Roster>
    where
        F: FnOnce(&mut Combatant),
    {
        let index = self
            .members
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| CoreError::CombatantNotFound(id.clone()))?;
        let mut next = self.clone();
        f(&mut Arc::make_mut(&mut next.members)[index]);
        Ok(next)
    }

    /// Return a new snapshot with `member` added as a party member.
    ///
    /// Non-player members start (or restart) with a relationship of 0.
    pub fn join(&self, member: Combatant) -> CoreResult<Roster> {
        if self.contains(&member.id) {
            return Err(CoreError::DuplicateCombatant(member.id));
        }
        if self.members.len() >= MAX_PARTY_SIZE {
            return Err(CoreError::PartyFull {
                max: MAX_PARTY_SIZE,
            });
        }
        let mut member = member;
        member.allegiance = Allegiance::Ally;
        member.relationship = if member.is_player {
            None
        } else {
            Some(Relationship::new())
        };
        tracing::debug!(id = %member.id, "member joined");
        let mut next = self.clone();
        Arc::make_mut(&mut next.members).push(member);
        Ok(next)
    }

    /// Return a new snapshot without the member `id`.
    pub fn leave(&self, id: &CombatantId) -> CoreResult<Roster> {
        if !self.contains(id) {
            return Err(CoreError::CombatantNotFound(id.clone()));
        }
        tracing::debug!(%id, "member left");
        let mut next = self.clone();
        Arc::make_mut(&mut next.members).retain(|c| &c.id != id);
        Ok(next)
    }
}

impl From<Vec<Combatant>> for Roster {
    fn from(members: Vec<Combatant>) -> Self {
        Self::new(members)
    }
}

impl From<Roster> for Vec<Combatant> {
    fn from(roster: Roster) -> Self {
        Arc::unwrap_or_clone(roster.members)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Combatant;
    type IntoIter = std::slice::Iter<'a, Combatant>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityScores;

    fn member(id: &str, hp: i32) -> Combatant {
        Combatant::ally(id, id, hp, AbilityScores::default())
    }

    fn party() -> Roster {
        Roster::new(vec![
            member("tav", 10).as_player(),
            member("astarion", 8).as_companion(),
        ])
    }

    #[test]
    fn update_returns_new_snapshot() {
        let before = party();
        let after = before
            .update(&CombatantId::from("astarion"), |c| {
                c.take_damage(5);
            })
            .unwrap();
        assert_eq!(before.get(&"astarion".into()).unwrap().hp(), 8);
        assert_eq!(after.get(&"astarion".into()).unwrap().hp(), 3);
        assert!(!before.same_snapshot(&after));
    }

    #[test]
    fn update_unknown_member() {
        let roster = party();
        assert!(matches!(
            roster.update(&"minsc".into(), |_| {}),
            Err(CoreError::CombatantNotFound(_))
        ));
    }

    #[test]
    fn join_starts_relationship_at_zero() {
        let mut gale = member("gale", 6).as_companion();
        gale.relationship = Some(Relationship::with_score(70));
        let roster = party().join(gale).unwrap();
        let joined = roster.get(&"gale".into()).unwrap();
        assert_eq!(joined.relationship, Some(Relationship::new()));
        assert_eq!(joined.allegiance, Allegiance::Ally);
    }

    #[test]
    fn join_rejects_duplicates() {
        let roster = party();
        assert!(matches!(
            roster.join(member("tav", 10)),
            Err(CoreError::DuplicateCombatant(_))
        ));
    }

    #[test]
    fn join_rejects_seventh_member() {
        let mut roster = Roster::default();
        for i in 0..MAX_PARTY_SIZE {
            roster = roster.join(member(&format!("m{i}"), 5)).unwrap();
        }
        assert!(matches!(
            roster.join(member("extra", 5)),
            Err(CoreError::PartyFull { max: 6 })
        ));
    }

    #[test]
    fn rejoining_resets_relationship() {
        let roster = party()
            .update(&"astarion".into(), |c| {
                if let Some(rel) = c.relationship.as_mut() {
                    rel.adjust(40);
                }
            })
            .unwrap();
        let astarion = roster.get(&"astarion".into()).unwrap().clone();
        let roster = roster.leave(&"astarion".into()).unwrap();
        assert!(!roster.contains(&"astarion".into()));
        let roster = roster.join(astarion).unwrap();
        assert_eq!(
            roster.get(&"astarion".into()).unwrap().relationship,
            Some(Relationship::new())
        );
    }

    #[test]
    fn living_and_all_incapacitated() {
        let roster = party()
            .update(&"tav".into(), |c| c.set_hp(0))
            .unwrap();
        assert_eq!(roster.living().len(), 1);
        assert!(!roster.all_incapacitated());
        let roster = roster.update(&"astarion".into(), |c| c.set_hp(0)).unwrap();
        assert!(roster.all_incapacitated());
    }

    #[test]
    fn totals() {
        let roster = party().update(&"tav".into(), |c| c.set_hp(4)).unwrap();
        assert_eq!(roster.total_hp(), 12);
        assert_eq!(roster.total_max_hp(), 18);
    }

    #[test]
    fn serde_round_trip_as_list() {
        let roster = party();
        let json = serde_json::to_string(&roster).unwrap();
        assert!(json.starts_with('['));
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roster);
    }
}

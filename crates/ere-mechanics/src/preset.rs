//! Ready-made rosters for demos and tests.
//!
//! These build the same combatants a world controller would hand in, without
//! requiring any external character data.

use ere_core::{Ability, AbilityScores, Combatant, Roster, modifier};

/// Base hit points before the constitution modifier.
pub const BASE_HIT_POINTS: i32 = 10;

/// The player character's default ability scores.
pub fn default_player_scores() -> AbilityScores {
    AbilityScores::new(15, 14, 13, 12, 10, 8)
}

/// Build a player character: `BASE_HIT_POINTS` plus the constitution modifier.
pub fn player(name: impl Into<String>, abilities: AbilityScores) -> Combatant {
    let hp = BASE_HIT_POINTS + modifier(abilities.get(Ability::Constitution));
    Combatant::ally("tav", name, hp, abilities).as_player()
}

/// Astarion, a rogue companion.
pub fn astarion() -> Combatant {
    Combatant::ally(
        "astarion",
        "Astarion",
        8,
        AbilityScores::new(8, 17, 14, 13, 13, 10),
    )
    .as_companion()
}

/// Gale, a wizard companion.
pub fn gale() -> Combatant {
    Combatant::ally("gale", "Gale", 6, AbilityScores::new(8, 14, 15, 17, 12, 13)).as_companion()
}

/// The starting party: the player followed by Astarion and Gale.
pub fn starting_party(player_name: impl Into<String>) -> Roster {
    Roster::new(vec![
        player(player_name, default_player_scores()),
        astarion(),
        gale(),
    ])
}

/// Two goblins waiting at the crash site.
pub fn goblin_ambush() -> Roster {
    Roster::new(vec![
        Combatant::enemy("goblin1", "Goblin Warrior", 15, 13, "1d6+2", 12),
        Combatant::enemy("goblin2", "Goblin Archer", 12, 14, "1d6+1", 15),
    ])
}

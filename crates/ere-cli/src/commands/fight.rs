use colored::Colorize;
use miette::IntoDiagnostic;
use serde::Serialize;

use ere_core::{Ability, CombatantId};
use ere_mechanics::{CombatOutcome, CombatPhase, CombatSnapshot, CombatUpdate, Encounter, preset};

use crate::config::EngineConfig;

/// Turn limit after which the demo gives up and abandons the fight.
const MAX_TURNS: usize = 500;

#[derive(Serialize)]
struct FightReport {
    outcome: CombatOutcome,
    turns: usize,
    snapshot: CombatSnapshot,
}

/// Pick an action for the active ally: drink when badly hurt, otherwise
/// focus the weakest enemy with a spell (casters) or a weapon.
fn choose_action(encounter: &Encounter) -> (&'static str, Option<CombatantId>) {
    let Some(actor) = encounter.active_actor() else {
        return ("defend", None);
    };
    if actor.hp_fraction() <= 0.34 {
        return ("healing_potion", None);
    }
    let target = encounter
        .enemies()
        .living()
        .into_iter()
        .min_by_key(|e| e.hp())
        .map(|e| e.id.clone());
    let action = if actor.score(Ability::Intelligence) > actor.score(Ability::Strength) {
        "magic_missile"
    } else {
        "weapon_attack"
    };
    (action, target)
}

fn ended(updates: &[CombatUpdate]) -> Option<CombatOutcome> {
    updates.iter().find_map(|u| match u {
        CombatUpdate::Ended(outcome) => Some(*outcome),
        CombatUpdate::Snapshot(_) => None,
    })
}

pub fn run(config: EngineConfig, seed: Option<u64>, json: bool) -> miette::Result<()> {
    let mut encounter_config = config.encounter;
    if seed.is_some() {
        encounter_config.seed = seed;
    }
    let (mut encounter, _) = Encounter::start(
        preset::starting_party("Tav"),
        preset::goblin_ambush(),
        encounter_config,
    );

    let outcome = loop {
        let updates = if encounter.turn_index() >= MAX_TURNS {
            tracing::warn!(turns = MAX_TURNS, "turn limit reached, abandoning fight");
            encounter.abandon()
        } else if encounter.phase() == CombatPhase::AwaitingPlayer {
            let (action, target) = choose_action(&encounter);
            encounter
                .send_action(action, target.as_ref())
                .into_diagnostic()?
        } else {
            let wait = encounter
                .time_until_next()
                .ok_or_else(|| miette::miette!("encounter stalled in {:?}", encounter.phase()))?;
            encounter.advance(wait)
        };
        if let Some(outcome) = ended(&updates) {
            break outcome;
        }
    };

    if json {
        let report = FightReport {
            outcome,
            turns: encounter.turn_index(),
            snapshot: encounter.snapshot(),
        };
        let text = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{text}");
        return Ok(());
    }

    println!("  {}", "Combat Log".bold().underline());
    for line in encounter.log().entries() {
        println!("  {line}");
    }
    println!();
    let verdict = match outcome {
        CombatOutcome::Victory => "Victory".green().bold(),
        CombatOutcome::Defeat => "Defeat".red().bold(),
        CombatOutcome::Abandoned => "Abandoned".yellow().bold(),
    };
    println!("  Outcome: {verdict} after {} turns", encounter.turn_index());
    println!("{}", super::roster_table(encounter.party()));
    Ok(())
}

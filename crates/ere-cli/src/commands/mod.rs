pub mod fight;
pub mod party;
pub mod roll;
pub mod talk;

use comfy_table::{ContentArrangement, Table};

use ere_core::{Ability, Combatant, Roster};

/// Format a modifier with an explicit sign.
fn signed(value: i32) -> String {
    format!("{value:+}")
}

fn relationship_cell(member: &Combatant) -> String {
    match member.relationship {
        Some(r) => format!("{r} ({})", r.tier()),
        None => "—".to_string(),
    }
}

/// Table of party members with hit points, armor class, modifiers, and relationship.
pub fn roster_table(roster: &Roster) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Name".to_string(), "HP".to_string(), "AC".to_string()];
    header.extend(Ability::ALL.iter().map(|a| a.abbreviation().to_string()));
    header.push("Relationship".to_string());
    table.set_header(header);

    for member in roster {
        let mut row = vec![
            member.name.clone(),
            format!("{}/{}", member.hp(), member.max_hp()),
            member.armor_class.to_string(),
        ];
        row.extend(
            Ability::ALL
                .iter()
                .map(|a| signed(member.abilities.modifier(*a))),
        );
        row.push(relationship_cell(member));
        table.add_row(row);
    }
    table
}

use colored::Colorize;

use ere_mechanics::preset;

pub fn run(name: &str) -> miette::Result<()> {
    let party = preset::starting_party(name);
    println!("  {}", "Party".bold());
    println!("{}", super::roster_table(&party));
    println!();
    println!("  {}/{} HP total", party.total_hp(), party.total_max_hp());
    Ok(())
}

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use ere_mechanics::DiceExpression;
use ere_mechanics::dice;

pub fn run(expression: &str, seed: Option<u64>) -> miette::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match DiceExpression::parse(expression) {
        Ok(expr) => {
            let roll = expr.roll(&mut rng);
            println!("  {} {roll}", format!("{expr}:").bold());
            println!(
                "  range {}-{}, average {:.1}",
                expr.min(),
                expr.max(),
                expr.average()
            );
        }
        Err(e) => {
            let total = dice::roll_expression(&mut rng, expression);
            println!("  {}", format!("{e}, using fallback roll").yellow());
            println!("  {} {total}", format!("{expression}:").bold());
        }
    }
    Ok(())
}

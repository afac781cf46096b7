use std::fs;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use miette::{Context, IntoDiagnostic};

use ere_dialogue::{Conversation, DialogueContent, DialogueNode, ScriptedContent};
use ere_mechanics::preset;

use crate::config::EngineConfig;

fn load_content(path: Option<&Path>) -> miette::Result<Arc<dyn DialogueContent>> {
    let Some(path) = path else {
        return Ok(Arc::new(ScriptedContent::companions()));
    };
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read dialogue content {}", path.display()))?;
    let content = ScriptedContent::from_json(&text).into_diagnostic()?;
    Ok(Arc::new(content))
}

fn print_node(node: &DialogueNode) {
    println!("  {} \"{}\"", format!("{}:", node.speaker).bold(), node.text);
    for (i, option) in node.options.iter().enumerate() {
        let tag = if option.kind.is_check() {
            format!(" ({} DC {})", option.kind, option.effective_difficulty())
        } else {
            String::new()
        };
        println!("    [{i}] {}{}", option.text, tag.dimmed());
    }
}

pub fn run(
    speaker: &str,
    choices: &[usize],
    config: EngineConfig,
    seed: Option<u64>,
    content: Option<&Path>,
) -> miette::Result<()> {
    let content = load_content(content)?;
    let mut dialogue_config = config.dialogue;
    if seed.is_some() {
        dialogue_config.seed = seed;
    }
    let delay = dialogue_config.advance_delay();
    let name = content.speaker_name(speaker).unwrap_or(speaker).to_string();

    let party = preset::starting_party("Tav");
    let character = preset::player("Tav", preset::default_player_scores());
    let (mut conversation, update) =
        Conversation::start(speaker, character, party, content, dialogue_config);

    let Some(node) = update.node else {
        println!("  No dialogue available with {name} yet.");
        return Ok(());
    };
    print_node(&node);

    for &choice in choices {
        let shown = conversation.transcript().len();
        match conversation.choose_option(choice) {
            Ok(update) => {
                println!();
                for line in &update.transcript[shown..] {
                    println!("  {line}");
                }
            }
            Err(e) => {
                println!("  {}", e.to_string().yellow());
                continue;
            }
        }
        for update in conversation.advance(delay) {
            if let Some(node) = &update.node {
                println!();
                print_node(node);
            }
        }
    }

    let relationship = conversation
        .relationship()
        .map(|r| format!("{r} ({})", r.tier()))
        .unwrap_or_else(|| "—".to_string());
    println!();
    println!("  Relationship with {name}: {relationship}");
    println!("{}", super::roster_table(&conversation.end()));
    Ok(())
}

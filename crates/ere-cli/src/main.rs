//! CLI driver for the encounter resolution engine.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "ere",
    about = "Encounter resolution engine: dice, turn-based combat, and skill-check dialogue",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a dice expression such as 2d6+3
    Roll {
        /// Dice expression (NdS or NdS+B)
        expression: String,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show the starting party
    Party {
        /// Name of the player character
        #[arg(short, long, default_value = "Tav")]
        name: String,
    },

    /// Auto-play the goblin ambush
    Fight {
        /// RNG seed for a reproducible fight (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Talk to a companion
    Talk {
        /// Speaker id (e.g. astarion, gale)
        speaker: String,

        /// Option index to choose; repeat to continue the conversation
        #[arg(short = 'C', long = "choose")]
        choices: Vec<usize>,

        /// RNG seed for reproducible checks (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON dialogue content file (default: built-in companions)
        #[arg(long)]
        content: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Roll { expression, seed } => commands::roll::run(&expression, seed),
        Commands::Party { name } => commands::party::run(&name),
        Commands::Fight { seed, config, json } => {
            let config = config::EngineConfig::load(config.as_deref())?;
            commands::fight::run(config, seed, json)
        }
        Commands::Talk {
            speaker,
            choices,
            seed,
            config,
            content,
        } => {
            let config = config::EngineConfig::load(config.as_deref())?;
            commands::talk::run(&speaker, &choices, config, seed, content.as_deref())
        }
    }
}

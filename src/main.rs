// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use gridstrument::config::packs::SOUND_PACKS;
use gridstrument::engine::mock::MockEngine;
use gridstrument::{GridStrument, InstrumentConfig, Key};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A grid instrument that sonifies cursor movement."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the built-in sound packs.
    Packs {},
    /// Loads and validates an instrument configuration.
    Validate {
        /// The path to the instrument config.
        config_path: PathBuf,
    },
    /// Walks the instrument with a key script and prints what the engine was told.
    Walk {
        /// The path to the instrument config.
        config_path: PathBuf,
        /// The keys to press. Should be in the form <KEY>,<KEY>,...
        /// For example, left,left,up,enter.
        keys: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Packs {} => {
            println!("Sound packs (count: {}):", SOUND_PACKS.len());
            for pack in SOUND_PACKS {
                let notes: Vec<&str> = pack.samples.iter().map(|(note, _)| *note).collect();
                println!("- {} ({})", pack.name, notes.join(", "));
            }
        }
        Commands::Validate { config_path } => {
            let config = InstrumentConfig::deserialize(&config_path)?;
            config.validate()?;
            println!("{} is valid.", config_path.display());
            println!("- Layout: {:?}", config.sound().layout());
            println!("- Chain: {}", config.chain()?);
            println!("- Start: {}", config.grid().start());
        }
        Commands::Walk { config_path, keys } => {
            let keys = keys
                .split(',')
                .filter(|key| !key.trim().is_empty())
                .map(|key| key.parse::<Key>())
                .collect::<Result<Vec<Key>, _>>()?;

            let config = InstrumentConfig::deserialize(&config_path)?;
            let mut instrument = GridStrument::new(MockEngine::new("walk"), config)?;
            instrument.scheduler_mut().wait_for_library().await?;

            for key in keys {
                let outcome = instrument.handle_key(key)?;
                println!("{} -> {:?} at {}", key, outcome, instrument.cursor());
            }

            println!("Engine commands:");
            for command in instrument.scheduler().engine().commands() {
                println!("- {}", command);
            }
        }
    }

    Ok(())
}

//! Config command - show and change settings.json

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use finboard_core::config::{Config, CONFIG_KEYS};

use super::get_finboard_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (environment overrides applied)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one setting
    Get {
        /// api-url, timeout-secs, cache-ttl-secs or history-days
        key: String,
    },

    /// Change a setting in settings.json
    Set {
        /// api-url, timeout-secs, cache-ttl-secs or history-days
        key: String,
        value: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let finboard_dir = get_finboard_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&finboard_dir)?;
            let mut values = BTreeMap::new();
            for key in CONFIG_KEYS {
                values.insert(*key, config.get(key)?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&values)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Setting", "Value"]);
            for key in CONFIG_KEYS {
                table.add_row(vec![key.to_string(), values[key].clone()]);
            }
            println!("{}", table);
            println!(
                "{}",
                format!("Settings file: {}", finboard_dir.join("settings.json").display()).dimmed()
            );
        }
        ConfigCommands::Get { key } => {
            let config = Config::load(&finboard_dir)?;
            println!("{}", config.get(&key)?);
        }
        ConfigCommands::Set { key, value } => {
            std::fs::create_dir_all(&finboard_dir).with_context(|| {
                format!("Failed to create finboard directory: {:?}", finboard_dir)
            })?;
            let mut config = Config::load_file(&finboard_dir)?;
            config.set(&key, &value)?;
            config.save(&finboard_dir).context("Failed to write settings")?;
            output::success(&format!("✓ {} = {}", key, config.get(&key)?));
        }
    }

    Ok(())
}

use clap::Subcommand;
use paceloop_core::storage::Database;
use paceloop_core::{Config, Phase};

use super::walk::load_state;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Print the whole configuration
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            // Cue controls are locked while a walk is underway; the cue
            // mode is fixed for the lifetime of a session.
            if key.starts_with("cues.") {
                let db = Database::open()?;
                if load_state(&db).phase != Phase::Stopped {
                    return Err("cannot change cue settings while a walk is active".into());
                }
            }
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in Config::keys() {
                println!("{key} = {}", config.get(key)?);
            }
        }
    }
    Ok(())
}

mod config;
pub mod database;

pub use config::{Config, CueSettings, WalkSettings};
pub use database::{Database, Stats, WalkSessionRow};

use std::path::PathBuf;

/// Returns `~/.config/paceloop[-dev]/` based on PACELOOP_ENV.
///
/// Set PACELOOP_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PACELOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("paceloop-dev")
    } else {
        base_dir.join("paceloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

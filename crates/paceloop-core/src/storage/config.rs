//! TOML-based application configuration.
//!
//! Stores the cue and walk preferences a session is started from.
//! Configuration lives at `~/.config/paceloop/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::session::{CuePreference, SessionConfig, DEFAULT_PHASE_LEN_SECS};

/// Cue preferences. The cue mode is read once when a session starts and
/// stays fixed until it ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default)]
    pub preference: CuePreference,
    #[serde(default = "default_true")]
    pub haptics: bool,
}

/// Walk shape preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkSettings {
    /// Default session length in minutes; must be one of the supported
    /// choices when a session is built from it.
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
    #[serde(default = "default_phase_len_secs")]
    pub phase_len_secs: u64,
}

/// Application configuration, serialized to/from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub walk: WalkSettings,
    #[serde(default)]
    pub cues: CueSettings,
}

fn default_true() -> bool {
    true
}
fn default_duration_min() -> u32 {
    15
}
fn default_phase_len_secs() -> u64 {
    DEFAULT_PHASE_LEN_SECS
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            preference: CuePreference::default(),
            haptics: true,
        }
    }
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            duration_min: default_duration_min(),
            phase_len_secs: default_phase_len_secs(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the config, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Build a validated [`SessionConfig`], optionally overriding the
    /// stored duration and cue mode.
    pub fn session_config(
        &self,
        duration_min: Option<u32>,
        preference: Option<CuePreference>,
    ) -> Result<SessionConfig, ValidationError> {
        let minutes = duration_min.unwrap_or(self.walk.duration_min);
        let mut config = SessionConfig::for_duration(
            minutes,
            preference.unwrap_or(self.cues.preference),
            self.cues.haptics,
        )?;
        if self.walk.phase_len_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "walk.phase_len_secs".into(),
                message: "must be positive".into(),
            });
        }
        config.phase_len_secs = self.walk.phase_len_secs;
        Ok(config)
    }

    /// Dotted-key getter for the CLI.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "walk.duration_min" => Ok(self.walk.duration_min.to_string()),
            "walk.phase_len_secs" => Ok(self.walk.phase_len_secs.to_string()),
            "cues.preference" => Ok(match self.cues.preference {
                CuePreference::Beep => "beep".into(),
                CuePreference::Voice => "voice".into(),
            }),
            "cues.haptics" => Ok(self.cues.haptics.to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Dotted-key setter for the CLI.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "walk.duration_min" => {
                self.walk.duration_min =
                    value.parse().map_err(|_| invalid("expected an integer"))?;
            }
            "walk.phase_len_secs" => {
                let secs: u64 = value.parse().map_err(|_| invalid("expected an integer"))?;
                if secs == 0 {
                    return Err(invalid("must be positive"));
                }
                self.walk.phase_len_secs = secs;
            }
            "cues.preference" => {
                self.cues.preference = match value {
                    "beep" => CuePreference::Beep,
                    "voice" => CuePreference::Voice,
                    _ => return Err(invalid("expected 'beep' or 'voice'")),
                };
            }
            "cues.haptics" => {
                self.cues.haptics = value
                    .parse()
                    .map_err(|_| invalid("expected 'true' or 'false'"))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "walk.duration_min",
            "walk.phase_len_secs",
            "cues.preference",
            "cues.haptics",
        ]
    }
}

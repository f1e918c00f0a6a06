//! Tournament configuration loaded from `tournament.toml`.
//!
//! Every field has a default, so an absent file or an empty one is a valid
//! configuration. Command-line flags override individual values after
//! loading; [`TournamentConfig::validate`] runs last.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What to do when a single match fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the tournament at the first failed match.
    #[default]
    Abort,
    /// Record the failure and carry on with the rest of the schedule.
    Continue,
}

/// Settings for one tournament run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TournamentConfig {
    /// Directory holding one engine executable per participant.
    pub models_dir: PathBuf,
    /// Glob applied inside `models_dir` when discovering participants.
    pub pattern: String,
    /// Explicit participant list. Empty means discover from `models_dir`.
    pub participants: Vec<String>,
    /// Number of complete round-robin cycles.
    pub cycles: u32,
    pub k_factor: f64,
    /// PGN file the games are appended to.
    pub output: PathBuf,
    pub event: String,
    pub site: String,
    /// Arguments for every UCI `go` command.
    pub time_control: String,
    /// Ply budget per game. Unset means games run until the rules end them.
    pub max_plies: Option<u32>,
    /// Matches played at once. 1 plays the schedule strictly in order.
    pub workers: usize,
    /// Schedule position to start from when resuming.
    pub start_at: usize,
    pub on_match_error: FailurePolicy,
    /// `setoption` values sent to every engine.
    pub uci_options: BTreeMap<String, String>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            pattern: "*".to_string(),
            participants: Vec::new(),
            cycles: 1,
            k_factor: crate::elo::K_FACTOR,
            output: PathBuf::from("tournament_games.pgn"),
            event: "Round Robin Tournament".to_string(),
            site: "?".to_string(),
            time_control: "movetime 500".to_string(),
            max_plies: None,
            workers: 1,
            start_at: 0,
            on_match_error: FailurePolicy::Abort,
            uci_options: BTreeMap::new(),
        }
    }
}

impl TournamentConfig {
    /// Default configuration file name in the working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("tournament.toml")
    }

    /// Loads configuration from `path`, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles == 0 {
            return Err(ConfigError::Invalid {
                field: "cycles",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "k_factor",
                reason: format!("must be a positive number, got {}", self.k_factor),
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_plies == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_plies",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        if self.time_control.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "time_control",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

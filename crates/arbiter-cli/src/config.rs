//! Tournament configuration file loading.
//!
//! The configuration is a TOML rendering of [`TournamentConfig`]. Every key
//! is optional; a missing file yields the default configuration.

use std::path::{Path, PathBuf};

use arbiter_core::TournamentConfig;
use thiserror::Error;

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Default configuration file name.
pub fn default_path() -> PathBuf {
    PathBuf::from("arbiter.toml")
}

/// Loads the tournament configuration at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
/// or [`ConfigError::ParseError`] if it is not a valid configuration.
pub fn load(path: &Path) -> Result<TournamentConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(TournamentConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{ByeWinPolicy, PairingSystem, TiebreakKey, VoidedGamePolicy};
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
pairing_system = "round_robin"
total_rounds = 9
tie_break_order = ["sonneborn", "mutual", "buchholz"]
max_requested_byes = 2
master_seed = "club-2024"
allow_repeat_pairing = true
voided_games = "count"
bye_wins = "full"

[points]
win = 3.0
draw = 1.0
loss = 0.0
"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.pairing_system, PairingSystem::RoundRobin);
        assert_eq!(config.total_rounds, 9);
        assert_eq!(
            config.tie_break_order,
            vec![
                TiebreakKey::SonnebornBerger,
                TiebreakKey::MutualResult,
                TiebreakKey::Buchholz
            ]
        );
        assert_eq!(config.max_requested_byes, 2);
        assert_eq!(config.seed(), Some("club-2024"));
        assert!(config.allow_repeat_pairing);
        assert_eq!(config.voided_games, VoidedGamePolicy::Count);
        assert_eq!(config.bye_wins, ByeWinPolicy::Full);
        assert_eq!(config.points.win, 3.0);
        assert_eq!(config.points.draw, 1.0);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = load(file.path()).unwrap();
        assert_eq!(config, TournamentConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("arbiter.toml")).unwrap();
        assert_eq!(config, TournamentConfig::default());
    }

    #[test]
    fn test_unknown_tiebreak_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"tie_break_order = ["koya"]"#).unwrap();

        match load(file.path()) {
            Err(ConfigError::ParseError(_)) => {}
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path(), PathBuf::from("arbiter.toml"));
    }
}

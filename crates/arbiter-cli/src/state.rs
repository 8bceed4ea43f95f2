//! Roster files and tournament snapshots on disk.
//!
//! Both are JSON. A snapshot is the serialized [`Tournament`], so everything
//! needed to reproduce its pairings (including the master seed) travels with
//! it.

use std::path::Path;

use arbiter_core::{FideId, Player};
use arbiter_engine::Tournament;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when reading or writing state files.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Snapshot {0} already exists")]
    AlreadyExists(String),
}

/// One registration line of a roster file.
#[derive(Debug, Deserialize)]
pub struct RosterEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub rating: i32,
    /// Checked on load; the engine does not use it.
    #[serde(default)]
    pub fide_id: Option<FideId>,
}

impl From<RosterEntry> for Player {
    fn from(entry: RosterEntry) -> Self {
        Player::new(entry.id, entry.name, entry.rating)
    }
}

fn read(path: &Path) -> Result<String, StateError> {
    std::fs::read_to_string(path).map_err(|source| StateError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> Result<T, StateError> {
    serde_json::from_str(content).map_err(|source| StateError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a roster: a JSON array of [`RosterEntry`].
pub fn load_roster(path: &Path) -> Result<Vec<Player>, StateError> {
    let entries: Vec<RosterEntry> = parse(path, &read(path)?)?;
    for entry in &entries {
        if let Some(fide_id) = &entry.fide_id {
            tracing::debug!(player = entry.id, "FIDE id {}", fide_id);
        }
    }
    Ok(entries.into_iter().map(Player::from).collect())
}

/// Reads a tournament snapshot.
pub fn load(path: &Path) -> Result<Tournament, StateError> {
    parse(path, &read(path)?)
}

/// Writes a tournament snapshot as pretty JSON, replacing any previous one.
pub fn save(path: &Path, tournament: &Tournament) -> Result<(), StateError> {
    let json = serde_json::to_string_pretty(tournament).map_err(|source| StateError::Json {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| StateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!("Saved snapshot to {}", path.display());
    Ok(())
}

/// Writes a new snapshot, refusing to overwrite an existing one.
pub fn create(path: &Path, tournament: &Tournament) -> Result<(), StateError> {
    if path.exists() {
        return Err(StateError::AlreadyExists(path.display().to_string()));
    }
    save(path, tournament)
}

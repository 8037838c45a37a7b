//! World saves and player settings on disk
//!
//! Worlds live as `<name>.json` inside a saves directory. Every persisted
//! struct defaults missing fields, so older or partial files still load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::game::state::WorldState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid world name '{0}'")]
    InvalidName(String),
    #[error("world '{0}' not found")]
    NotFound(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed save: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory of saved worlds
#[derive(Debug, Clone)]
pub struct WorldStore {
    dir: PathBuf,
}

impl WorldStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Write the world, creating the saves directory if needed
    pub fn save(&self, name: &str, state: &WorldState) -> Result<(), PersistenceError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "World saved");
        Ok(())
    }

    /// Read and normalize a world
    pub fn load<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<WorldState, PersistenceError> {
        let path = self.path_for(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut state: WorldState = serde_json::from_str(&raw)?;
        state.normalize(rng);
        debug!(path = %path.display(), asteroids = state.asteroids.len(), "World loaded");
        Ok(state)
    }

    /// Names of saved worlds, sorted
    pub fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PersistenceError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Player display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player_name: String,
    pub ship_color_index: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            ship_color_index: 0,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Could not read settings {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&raw) {
            Ok(mut settings) => {
                if settings.player_name.trim().is_empty() {
                    settings.player_name = Self::default().player_name;
                }
                settings
            }
            Err(e) => {
                warn!("Malformed settings {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

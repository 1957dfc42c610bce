//! State carried from one run to the next.
//!
//! Loaded once in `main`, handed to the session, and written back once on
//! shutdown. Nothing reads it globally.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::search::SearchState;

/// Recent files and the last search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Most recently used first, no duplicates
    pub recent_files: Vec<PathBuf>,

    /// The last search the user ran
    pub last_search: Option<SearchState>,
}

impl PersistedState {
    /// Returns the default state file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(data_dir.join("ted").join("state.toml"))
    }

    /// Loads state from `path`; a missing file is an empty state.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes state to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Moves `path` to the front of the recent list, keeping at most `limit`.
    pub fn add_recent(&mut self, path: &Path, limit: usize) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_files_are_deduplicated_and_bounded() {
        let mut state = PersistedState::default();
        state.add_recent(Path::new("/a"), 2);
        state.add_recent(Path::new("/b"), 2);
        state.add_recent(Path::new("/a"), 2);
        assert_eq!(state.recent_files, vec![PathBuf::from("/a"), PathBuf::from("/b")]);

        state.add_recent(Path::new("/c"), 2);
        assert_eq!(state.recent_files, vec![PathBuf::from("/c"), PathBuf::from("/a")]);
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = PersistedState::load_from(dir.path().join("state.toml")).unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn test_state_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ted").join("state.toml");

        let mut state = PersistedState::default();
        state.add_recent(Path::new("/tmp/one.txt"), 9);
        state.last_search = Some(SearchState::new("needle").with_replacement("pin").match_case(true));
        state.save_to(&path).unwrap();

        assert_eq!(PersistedState::load_from(&path).unwrap(), state);
    }
}

//! Last-seen revision store.
//!
//! Maps record ids to the last revision a notification was sent for,
//! persisted as a YAML mapping in `state.yaml` under the data directory.
//! The ephemeral variant backs the `--no-store` flag: reads return empty and
//! `save` is a no-op.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

pub const STATE_FILE: &str = "state.yaml";

/// Error type for state persistence
#[derive(Debug)]
pub enum StateError {
    Read { path: String, reason: String },
    Parse { path: String, reason: String },
    Write { path: String, reason: String },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Read { path, reason } => {
                write!(f, "Failed to read state file {}: {}", path, reason)
            }
            StateError::Parse { path, reason } => {
                write!(f, "Failed to parse state file {}: {}", path, reason)
            }
            StateError::Write { path, reason } => {
                write!(f, "Failed to write state file {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Store of last-seen revisions keyed by record id.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// `None` = ephemeral (no persistence)
    path: Option<PathBuf>,
    entries: IndexMap<String, String>,
}

impl StateStore {
    /// Load state from `state.yaml` in the data directory.
    ///
    /// A missing or empty file loads as empty state; saving later creates it.
    ///
    /// # Errors
    /// Returns [`StateError`] if an existing file cannot be read or parsed.
    pub fn load(data_dir: &Path) -> Result<Self, StateError> {
        let path = data_dir.join(STATE_FILE);

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| StateError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            if contents.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_yaml::from_str(&contents).map_err(|e| StateError::Parse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
        } else {
            IndexMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Create a store that never reads or writes disk.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            entries: IndexMap::new(),
        }
    }

    /// Last seen revision for an id, or `""` when unknown.
    pub fn get(&self, id: &str) -> &str {
        self.entries.get(id).map(String::as_str).unwrap_or("")
    }

    /// Record a revision as seen for an id.
    pub fn set(&mut self, id: impl Into<String>, revision: impl Into<String>) {
        self.entries.insert(id.into(), revision.into());
    }

    /// Persist the store to disk. No-op for ephemeral stores.
    ///
    /// # Errors
    /// Returns [`StateError::Write`] if serialization or the write fails.
    pub fn save(&self) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_yaml::to_string(&self.entries).map_err(|e| StateError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        fs::write(path, contents).map_err(|e| StateError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateStore::load(dir.path()).unwrap();

        assert_eq!(state.get("anything"), "");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut state = StateStore::load(dir.path()).unwrap();
        state.set("some-repo", "v1.2");
        state.set("don//101", "101");
        state.save().unwrap();

        let reloaded = StateStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.get("some-repo"), "v1.2");
        assert_eq!(reloaded.get("don//101"), "101");
        assert_eq!(reloaded.get("unknown"), "");
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "").unwrap();

        let state = StateStore::load(dir.path()).unwrap();
        assert_eq!(state.get("x"), "");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "- not\n- a\n- mapping\n").unwrap();

        let result = StateStore::load(dir.path());
        assert!(matches!(result, Err(StateError::Parse { .. })));
    }

    #[test]
    fn test_ephemeral_never_touches_disk() {
        let mut state = StateStore::ephemeral();
        state.set("id", "rev");
        state.save().unwrap();

        assert_eq!(state.get("id"), "rev");
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let mut state = StateStore::ephemeral();
        state.set("id", "v1");
        state.set("id", "v2");

        assert_eq!(state.get("id"), "v2");
    }
}

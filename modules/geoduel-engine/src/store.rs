//! High score persistence.
//!
//! `KeyValueStore` is the flat string store the game persists into (browser
//! local storage on the web, a JSON file in the terminal). `ScoreStore` layers the
//! per-mode keys on top and swallows every failure with a logged default.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use geoduel_common::config::DEFAULT_SCORE_KEY_PREFIX;
use geoduel_common::{GameMode, ModeScores};
use tracing::warn;

use crate::error::PersistenceError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

// ---------------------------------------------------------------------------
// MemoryStore (tests)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore (terminal stand-in for local storage)
// ---------------------------------------------------------------------------

/// One JSON object on disk. Re-read on every access so concurrent edits by
/// hand are picked up; last write wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(PersistenceError::Read(format!("{}: {e}", self.path.display()))),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Read(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // An unreadable file is replaced rather than blocking every future write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "Score file unreadable, starting fresh");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| PersistenceError::Write(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PersistenceError::Write(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| PersistenceError::Write(format!("{}: {e}", self.path.display())))
    }
}

// ---------------------------------------------------------------------------
// ScoreStore
// ---------------------------------------------------------------------------

/// Per-mode high scores under `prefix + mode.key()`.
pub struct ScoreStore<K: KeyValueStore> {
    store: K,
    prefix: String,
}

impl<K: KeyValueStore> ScoreStore<K> {
    pub fn new(store: K) -> Self {
        Self::with_prefix(store, DEFAULT_SCORE_KEY_PREFIX)
    }

    pub fn with_prefix(store: K, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
        }
    }

    pub fn key(&self, mode: GameMode) -> String {
        format!("{}{}", self.prefix, mode.key())
    }

    /// Stored high score, 0 when absent, unparsable, or unreadable.
    pub fn get(&self, mode: GameMode) -> u32 {
        let key = self.key(mode);
        match self.store.get(&key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key = key.as_str(), raw = raw.as_str(), "Unparsable high score, using 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "High score read failed, using 0");
                0
            }
        }
    }

    /// Persist unconditionally. Failures are logged and dropped.
    pub fn set(&mut self, mode: GameMode, value: u32) {
        let key = self.key(mode);
        if let Err(e) = self.store.set(&key, &value.to_string()) {
            warn!(key = key.as_str(), value, error = %e, "High score write failed");
        }
    }

    pub fn all(&self) -> ModeScores {
        let mut scores = ModeScores::default();
        for mode in GameMode::ALL {
            scores.set(mode, self.get(mode));
        }
        scores
    }

    pub fn store(&self) -> &K {
        &self.store
    }
}

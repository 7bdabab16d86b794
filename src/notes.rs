//! Client-local scratch-note store.
//!
//! A flat JSON object of note name to text. Every write re-reads the file
//! first, and the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

/// Key of the note shown on the Notes page
pub const SCRATCH_KEY: &str = "scratch";

pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(Self::new(config_dir.join("dashkeys").join("notes.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every note. A missing or unreadable file is an empty store.
    pub fn load(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read note store");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(notes) => notes,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "note store is corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut notes = self.load();
        notes.insert(key.to_string(), value.to_string());
        self.write(&notes)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut notes = self.load();
        if notes.remove(key).is_some() {
            self.write(&notes)?;
        }
        Ok(())
    }

    fn write(&self, notes: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create note directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(notes).context("Failed to serialize notes")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write note store: {}", self.path.display()))
    }
}

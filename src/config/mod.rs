//! Configuration management for dashkeys.
//!
//! Handles persistence and loading of keyboard, search, palette, triage and
//! logging preferences.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::triage::SnoozeOption;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate();

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Clamp every section into its supported range
    pub fn validate(&mut self) {
        self.keyboard.validate();
        self.search.validate();
        self.palette.validate();
        self.triage.validate();
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;

        Ok(config_dir.join("dashkeys").join("config.json"))
    }
}

/// Leader key and chord timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardConfig {
    #[serde(default = "default_leader")]
    pub leader: char,
    #[serde(default = "default_chord_timeout_ms")]
    pub chord_timeout_ms: u64,
    #[serde(default = "default_chord_confirm_ms")]
    pub chord_confirm_ms: u64,
}

fn default_leader() -> char {
    'g'
}

fn default_chord_timeout_ms() -> u64 {
    1500
}

fn default_chord_confirm_ms() -> u64 {
    1200
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            leader: default_leader(),
            chord_timeout_ms: default_chord_timeout_ms(),
            chord_confirm_ms: default_chord_confirm_ms(),
        }
    }
}

impl KeyboardConfig {
    /// The leader must be a plain printable character
    pub fn validate(&mut self) {
        if self.leader.is_control() || self.leader.is_whitespace() {
            self.leader = default_leader();
        }
        self.chord_timeout_ms = self.chord_timeout_ms.clamp(300, 5000);
        self.chord_confirm_ms = self.chord_confirm_ms.clamp(200, 5000);
    }

    pub fn chord_timeout(&self) -> Duration {
        Duration::from_millis(self.chord_timeout_ms)
    }

    pub fn chord_confirm(&self) -> Duration {
        Duration::from_millis(self.chord_confirm_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Character that starts a quick-create command
    #[serde(default = "default_sentinel")]
    pub sentinel: char,
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_sentinel() -> char {
    '/'
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            sentinel: default_sentinel(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&mut self) {
        self.debounce_ms = self.debounce_ms.clamp(50, 2000);
        if self.sentinel.is_alphanumeric() || self.sentinel.is_whitespace() {
            self.sentinel = default_sentinel();
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// How long a quick-create error replaces the query
    #[serde(default = "default_error_restore_ms")]
    pub error_restore_ms: u64,
    /// How long the success message shows before the palette closes
    #[serde(default = "default_success_close_ms")]
    pub success_close_ms: u64,
}

fn default_error_restore_ms() -> u64 {
    1500
}

fn default_success_close_ms() -> u64 {
    600
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            error_restore_ms: default_error_restore_ms(),
            success_close_ms: default_success_close_ms(),
        }
    }
}

impl PaletteConfig {
    pub fn validate(&mut self) {
        self.error_restore_ms = self.error_restore_ms.clamp(500, 5000);
        self.success_close_ms = self.success_close_ms.min(3000);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Pause after each action before the next item takes keys (200-300ms)
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    /// Preset used by the list pages' snooze keys
    #[serde(default)]
    pub default_snooze: SnoozeOption,
}

fn default_transition_ms() -> u64 {
    250
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            transition_ms: default_transition_ms(),
            default_snooze: SnoozeOption::default(),
        }
    }
}

impl TriageConfig {
    /// Validate and clamp the transition window to 200-300ms
    pub fn validate(&mut self) {
        self.transition_ms = self.transition_ms.clamp(200, 300);
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `DASHKEYS_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file; defaults to the local data directory
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Where log lines go; the TUI owns stdout
    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }
        let data_dir = dirs::data_local_dir().context("Could not find local data directory")?;
        Ok(data_dir.join("dashkeys").join("dashkeys.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_timings() {
        let config = Config::default();
        assert_eq!(config.keyboard.leader, 'g');
        assert_eq!(config.keyboard.chord_timeout_ms, 1500);
        assert_eq!(config.keyboard.chord_confirm_ms, 1200);
        assert_eq!(config.search.debounce_ms, 200);
        assert_eq!(config.search.sentinel, '/');
        assert_eq!(config.palette.error_restore_ms, 1500);
        assert_eq!(config.triage.transition_ms, 250);
        assert_eq!(config.triage.default_snooze, SnoozeOption::Tomorrow);
    }

    #[test]
    fn transition_is_clamped_to_window() {
        let mut triage = TriageConfig {
            transition_ms: 50,
            ..Default::default()
        };
        triage.validate();
        assert_eq!(triage.transition_ms, 200);

        let mut triage = TriageConfig {
            transition_ms: 900,
            ..Default::default()
        };
        triage.validate();
        assert_eq!(triage.transition_ms, 300);
    }

    #[test]
    fn falls_back_when_leader_is_unusable() {
        let mut keyboard = KeyboardConfig {
            leader: ' ',
            ..Default::default()
        };
        keyboard.validate();
        assert_eq!(keyboard.leader, 'g');
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"triage": {"default_snooze": "next_week"}}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.triage.default_snooze, SnoozeOption::NextWeek);
        assert_eq!(config.triage.transition_ms, 250);
        assert_eq!(config.keyboard.leader, 'g');
    }

    #[test]
    fn loads_defaults_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.search.debounce_ms, 200);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let mut config = Config::default();
        config.keyboard.leader = ';';
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.keyboard.leader, ';');
    }
}

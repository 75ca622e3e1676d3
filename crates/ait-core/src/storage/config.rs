//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Engine resolution (ticks per second)
//! - Sound preference
//! - Saved interval programs and the one last opened
//!
//! Configuration is stored at `~/.config/ait/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use super::store::{load_or_default, IntervalRecord, MemoryStore, DEFAULT_INTERVAL_UUID};
use crate::error::ConfigError;
use crate::timer::{validate_resolution, SequenceConfig, TimerConfig};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_resolution")]
    pub resolution: u32,
}

/// Audible signal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSettings {
    /// Zero or negative mutes every cue.
    #[serde(default = "default_sound")]
    pub sound: i32,
}

impl SignalSettings {
    pub fn muted(&self) -> bool {
        self.sound <= 0
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ait/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Program opened last; used to resume where the user left off.
    #[serde(default = "default_current_uuid")]
    pub current_uuid: String,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub signal: SignalSettings,
    #[serde(default = "default_programs")]
    pub programs: Vec<IntervalRecord>,
}

// Default functions
fn default_resolution() -> u32 {
    TimerConfig::DEFAULT_RESOLUTION
}
fn default_sound() -> i32 {
    1
}
fn default_current_uuid() -> String {
    DEFAULT_INTERVAL_UUID.into()
}
fn default_programs() -> Vec<IntervalRecord> {
    vec![IntervalRecord::default_for(DEFAULT_INTERVAL_UUID)]
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
        }
    }
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            sound: default_sound(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_uuid: default_current_uuid(),
            timer: TimerSettings::default(),
            signal: SignalSettings::default(),
            programs: default_programs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = match current {
                    serde_json::Value::Array(items) => part
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| items.get_mut(i))
                        .ok_or_else(unknown)?,
                    other => other.get_mut(part).ok_or_else(unknown)?,
                };
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<i64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as integer")));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default, writing the default out.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_resolution(self.timer.resolution).map_err(|e| ConfigError::InvalidValue {
            key: "timer.resolution".into(),
            message: e.to_string(),
        })
    }

    /// Program stored under `uuid`.
    pub fn program(&self, uuid: &str) -> Option<&IntervalRecord> {
        self.programs.iter().find(|p| p.uuid == uuid)
    }

    /// Open program `uuid`, or the current one, as a runnable sequence.
    ///
    /// A default program is seeded when nothing is stored under the uuid.
    /// The opened program becomes current; nothing is written to disk.
    pub async fn open_program(
        &mut self,
        uuid: Option<&str>,
    ) -> crate::Result<(IntervalRecord, SequenceConfig)> {
        let uuid = uuid.map_or_else(|| self.current_uuid.clone(), str::to_string);
        let mut store = MemoryStore::from_records(self.programs.clone());
        let record = load_or_default(&mut store, &uuid).await?;
        if self.program(&uuid).is_none() {
            self.programs.push(record.clone());
        }
        self.current_uuid = uuid;

        let sequence = record.to_sequence_config(self.timer.resolution)?;
        Ok((record, sequence))
    }

    /// Remove a program. When it was the current one, the first remaining
    /// program (or the default uuid) becomes current.
    pub fn remove_program(&mut self, uuid: &str) -> bool {
        let before = self.programs.len();
        self.programs.retain(|p| p.uuid != uuid);
        let removed = self.programs.len() < before;
        if removed && self.current_uuid == uuid {
            self.current_uuid = self
                .programs
                .first()
                .map_or_else(default_current_uuid, |p| p.uuid.clone());
        }
        removed
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

mod config;
mod store;

pub use config::{Config, SignalSettings, TimerSettings};
pub use store::{
    load_or_default, CountdownWarnings, IntervalRecord, Limits, MemoryStore, SequenceStore,
    DEFAULT_INTERVAL_UUID,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/ait[-dev]/` based on AIT_ENV.
///
/// Set AIT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("AIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ait-dev")
    } else {
        base_dir.join("ait")
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

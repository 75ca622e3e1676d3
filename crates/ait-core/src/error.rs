//! Core error types for ait-core.
//!
//! This module defines the error hierarchy using thiserror. Construction and
//! command errors are returned at the call site; runtime faults during ticking
//! are surfaced once through the subscription's error channel.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::SequenceStatus;

/// Core error type for ait-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Countdown / sequencer errors
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by the countdown engine and the interval sequencer.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// Construction-time contract violation. The instance must be rebuilt
    /// with a corrected configuration.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// State machine misuse. The sequencer state is left unchanged.
    #[error("Cannot {command} a sequence that is {from:?}")]
    InvalidTransition {
        from: SequenceStatus,
        command: &'static str,
    },

    /// The tick source failed while the sequence was running.
    #[error("Clock fault: {0}")]
    Clock(#[from] ClockError),

    /// The sequencer lost its countdown engine mid-phase.
    #[error("Engine fault: {0}")]
    EngineFault(String),
}

impl SequenceError {
    pub(crate) fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        SequenceError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Tick source errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// Resolution must be a positive divisor of 10.
    #[error("Unsupported clock resolution: {0} ticks per second")]
    InvalidResolution(u32),

    /// The clock ticks at a different rate than the sequence counts.
    #[error("Clock ticks {clock} times per second but the sequence expects {sequence}")]
    ResolutionMismatch { clock: u32, sequence: u32 },

    /// The underlying timer stopped producing ticks.
    #[error("{0}")]
    Fault(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be prepared
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage collaborator errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored record does not describe a valid sequence
    #[error("Record '{uuid}' is not a valid sequence: {source}")]
    InvalidRecord {
        uuid: String,
        #[source]
        source: SequenceError,
    },

    /// The backing store failed
    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// A remaining-time text that is not in `mm:ss.t` form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed time text '{text}': expected mm:ss.t")]
pub struct TimeTextError {
    pub text: String,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

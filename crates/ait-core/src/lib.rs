//! # AiT Core Library
//!
//! This library provides the core logic for AiT, an interval workout timer.
//! All timing behaviour lives here; front ends only forward button presses
//! and render what the sequencer emits.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: a single-phase, tick-indexed countdown producing a
//!   remaining-time text and a state mask per tick
//! - **Interval Sequencer**: chains countdown, active and rest phases, counts
//!   intervals and decorates ticks with warning beeps
//! - **Session**: drives a sequencer from a clock source and a command channel
//! - **Storage**: TOML configuration and the interval program store
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: single-phase countdown
//! - [`IntervalSequencer`]: workout state machine
//! - [`Session`]: clock and command loop
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{
    ClockError, ConfigError, CoreError, Result, SequenceError, StoreError, TimeTextError,
};
pub use events::Event;
pub use protocol::{Beep, Flag, PhaseKind, StateMask, Status, TickEmission};
pub use session::{Command, ControlAction, Session};
pub use storage::{Config, IntervalRecord, MemoryStore, SequenceStore};
pub use timer::{
    ClockSource, CountdownEngine, IntervalClock, IntervalSequencer, Notification, Observer,
    SequenceConfig, SequenceStatus, Subscription, TimerConfig, Warnings,
};

//! Single-phase countdown engine.
//!
//! The engine turns a duration into a finite stream of [`TickEmission`]s at a
//! fixed resolution. It has no clock of its own: whoever owns it pulls the
//! next tick when the clock source fires.
//!
//! ## State rules (in order)
//!
//! ```text
//! remaining == duration   -> Active|Start|Instant
//! remaining == 0          -> Completed (last tick)
//! remaining == get_ready  -> Active|GetReady|Instant
//! GetReady on a whole sec -> previous | Instant
//! otherwise               -> previous without Start/Instant
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;
use crate::protocol::{time_text, StateMask, Status, TickEmission};

const TENTHS_PER_SECOND: u64 = 10;

/// Input to one countdown phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub duration_seconds: u32,
    pub get_ready_seconds: u32,
    /// Ticks per second. Must divide 10 so every tick is a distinct tenth.
    pub resolution: u32,
}

impl TimerConfig {
    pub const DEFAULT_RESOLUTION: u32 = 10;

    pub fn new(duration_seconds: u32, get_ready_seconds: u32, resolution: u32) -> Self {
        Self {
            duration_seconds,
            get_ready_seconds,
            resolution,
        }
    }

    /// Duration given in minutes.
    pub fn from_minutes(duration_minutes: u32, get_ready_seconds: u32, resolution: u32) -> Self {
        Self::new(
            duration_minutes.saturating_mul(60),
            get_ready_seconds,
            resolution,
        )
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.duration_seconds == 0 {
            return Err(SequenceError::invalid_config(
                "duration_seconds",
                "must be greater than zero",
            ));
        }
        if self.get_ready_seconds > self.duration_seconds {
            return Err(SequenceError::invalid_config(
                "get_ready_seconds",
                format!(
                    "{} exceeds the duration of {} seconds",
                    self.get_ready_seconds, self.duration_seconds
                ),
            ));
        }
        validate_resolution(self.resolution)
    }

    pub fn total_ticks(&self) -> u64 {
        u64::from(self.duration_seconds) * u64::from(self.resolution)
    }
}

pub(crate) fn validate_resolution(resolution: u32) -> Result<(), SequenceError> {
    if resolution == 0 || TENTHS_PER_SECOND % u64::from(resolution) != 0 {
        return Err(SequenceError::invalid_config(
            "resolution",
            format!("{resolution} ticks per second does not divide a second into tenths"),
        ));
    }
    Ok(())
}

/// Bounded countdown for one phase.
///
/// Iterating yields exactly `total_ticks + 1` emissions, the last one
/// `Completed`. The engine cannot be restarted; build a new one instead.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    config: TimerConfig,
    total_ticks: u64,
    get_ready_offset_seconds: u32,
    /// Tenths of a second per tick.
    tick_tenths: u64,
    /// Index of the next tick `next()` will produce.
    position: u64,
    state: StateMask,
    finished: bool,
}

impl CountdownEngine {
    pub fn new(config: TimerConfig) -> Result<Self, SequenceError> {
        Self::resume_at(config, 0)
    }

    /// Build an engine positioned at tick `index`, carrying the state the
    /// phase had reached just before it. Used to resume a paused phase.
    pub fn resume_at(config: TimerConfig, index: u64) -> Result<Self, SequenceError> {
        config.validate()?;
        let total_ticks = config.total_ticks();
        if index > total_ticks {
            return Err(SequenceError::invalid_config(
                "index",
                format!("tick {index} is past the end of a {total_ticks}-tick countdown"),
            ));
        }

        let mut engine = Self {
            config,
            total_ticks,
            get_ready_offset_seconds: config.duration_seconds - config.get_ready_seconds,
            tick_tenths: TENTHS_PER_SECOND / u64::from(config.resolution),
            position: index,
            state: StateMask::LOADED,
            finished: false,
        };
        if index > 0 {
            engine.state = engine.state_before(index);
        }
        Ok(engine)
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Elapsed seconds at which the get-ready window opens.
    pub fn get_ready_offset_seconds(&self) -> u32 {
        self.get_ready_offset_seconds
    }

    /// Index of the next tick to be produced.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn state(&self) -> StateMask {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Remaining tenths of a second at tick `index`.
    pub fn remaining_tenths(&self, index: u64) -> u64 {
        self.total_ticks.saturating_sub(index) * self.tick_tenths
    }

    /// Compute tick `index` from the carried state.
    ///
    /// Returns `None` once the countdown has completed or when `index` is
    /// past the last tick.
    pub fn tick(&mut self, index: u64) -> Option<TickEmission> {
        if self.finished || index > self.total_ticks {
            return None;
        }

        let remaining = self.remaining_tenths(index);
        self.state = self.next_state(remaining);
        if self.state.status == Status::Completed {
            self.finished = true;
        }

        Some(TickEmission {
            state: self.state,
            remaining_time_text: time_text::format_tenths(remaining),
            remaining_tenths: remaining,
            phase: None,
            current_interval: None,
            remaining_interval_seconds: None,
            beep: None,
            total_remaining_text: None,
        })
    }

    fn next_state(&self, remaining: u64) -> StateMask {
        let previous = self.state.clear_momentary();
        let duration = u64::from(self.config.duration_seconds) * TENTHS_PER_SECOND;
        let get_ready = u64::from(self.config.get_ready_seconds) * TENTHS_PER_SECOND;

        if remaining == duration {
            StateMask::ACTIVE_START
        } else if remaining == 0 {
            StateMask::COMPLETED
        } else if remaining == get_ready {
            StateMask::ACTIVE_GET_READY_INSTANT
        } else if previous.get_ready && remaining % TENTHS_PER_SECOND == 0 {
            StateMask {
                instant: true,
                ..previous
            }
        } else {
            previous
        }
    }

    /// The state carried into tick `index` (> 0) by an uninterrupted run.
    fn state_before(&self, index: u64) -> StateMask {
        let previous_remaining = self.remaining_tenths(index - 1);
        let duration = u64::from(self.config.duration_seconds) * TENTHS_PER_SECOND;
        let get_ready = u64::from(self.config.get_ready_seconds) * TENTHS_PER_SECOND;

        if get_ready < duration && previous_remaining <= get_ready {
            StateMask::ACTIVE_GET_READY
        } else {
            StateMask::ACTIVE
        }
    }
}

impl Iterator for CountdownEngine {
    type Item = TickEmission;

    fn next(&mut self) -> Option<TickEmission> {
        let emission = self.tick(self.position)?;
        self.position += 1;
        Some(emission)
    }
}

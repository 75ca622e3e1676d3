use serde::{Deserialize, Serialize};

use super::state::{StateMask, Status};

/// Which part of the workout a phase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    /// Get-ready countdown before the first interval.
    Countdown,
    Active,
    Rest,
}

/// Audible cue requested by a tick. The core never plays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beep {
    /// Periodic on-the-second cue inside a warning window.
    SingleBeep,
    /// Entering a warning window.
    DoubleBeep,
}

/// One value per tick.
///
/// A bare countdown engine only fills `state`, `remaining_time_text` and
/// `remaining_tenths`; the interval sequencer adds the phase, interval
/// metadata, workout total and beep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEmission {
    pub state: StateMask,
    /// `mm:ss.t` remaining in the current phase.
    pub remaining_time_text: String,
    #[serde(skip)]
    pub remaining_tenths: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseKind>,
    /// 1-based interval index. Absent during the countdown phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_interval_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beep: Option<Beep>,
    /// `mm:ss.t` left in the whole workout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_remaining_text: Option<String>,
}

impl TickEmission {
    pub fn remaining_seconds(&self) -> f64 {
        self.remaining_tenths as f64 / 10.0
    }

    pub fn is_completed(&self) -> bool {
        self.state.status == Status::Completed
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::PhaseKind;

/// Every sequencer command produces an Event.
/// Ticks are not events; they are delivered to observers as emissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SequenceBuilt {
        phase_count: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    SequenceStarted {
        phase_index: usize,
        phase: PhaseKind,
        current_interval: u32,
        remaining_time_text: String,
        resumed: bool,
        at: DateTime<Utc>,
    },
    SequencePaused {
        phase_index: usize,
        remaining_time_text: String,
        at: DateTime<Utc>,
    },
    SequenceReset {
        at: DateTime<Utc>,
    },
    SequenceFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

//! Shared vocabulary between the countdown engine, the interval sequencer
//! and display collaborators.

mod emission;
mod state;
pub mod time_text;

pub use emission::{Beep, PhaseKind, TickEmission};
pub use state::{Flag, StateMask, Status};

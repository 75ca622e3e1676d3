mod clock;
mod countdown;
mod observer;
mod sequence;
mod sequencer;

pub use clock::{ClockSource, IntervalClock};
pub use countdown::{CountdownEngine, TimerConfig};
pub(crate) use countdown::validate_resolution;
pub use observer::{Notification, Observer, Subscription};
pub use sequence::{Phase, SequenceConfig, Warnings};
pub use sequencer::{IntervalSequencer, SequenceStatus};

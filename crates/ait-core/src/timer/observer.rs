use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::SequenceError;
use crate::protocol::TickEmission;

/// Receives the emissions of an [`IntervalSequencer`](super::IntervalSequencer).
///
/// At most one of `on_completed` / `on_error` is called, after which the
/// observer is dropped by the sequencer.
pub trait Observer {
    fn on_emission(&mut self, emission: &TickEmission);

    fn on_completed(&mut self) {}

    fn on_error(&mut self, _error: &SequenceError) {}
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) id: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Owned form of what an observer sees, for channel delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Emission(TickEmission),
    Completed,
    Error { message: String },
}

impl Notification {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Emission(_))
    }
}

/// Forward notifications over a channel. A dropped receiver is ignored.
impl Observer for UnboundedSender<Notification> {
    fn on_emission(&mut self, emission: &TickEmission) {
        let _ = self.send(Notification::Emission(emission.clone()));
    }

    fn on_completed(&mut self) {
        let _ = self.send(Notification::Completed);
    }

    fn on_error(&mut self, error: &SequenceError) {
        let _ = self.send(Notification::Error {
            message: error.to_string(),
        });
    }
}

pub(crate) struct Subscriber {
    pub(crate) id: u64,
    pub(crate) observer: Box<dyn Observer>,
}

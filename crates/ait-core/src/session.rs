//! Display-session driver.
//!
//! Binds a clock source, a sequencer and a command channel on one task.
//! Commands are always polled first, and the clock is only polled while the
//! sequence runs, so a pause cancels the pending tick before it can fire.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::error::{ClockError, SequenceError};
use crate::events::Event;
use crate::timer::{ClockSource, IntervalSequencer, SequenceConfig};

/// Commands accepted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Rebuild(SequenceConfig),
    Shutdown,
}

/// Buttons of the floating action menu on the display page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Home,
    Start,
    Pause,
    Reset,
    Program,
}

impl ControlAction {
    /// Leaving for the home or program menus pauses the workout.
    pub fn command(self) -> Command {
        match self {
            ControlAction::Start => Command::Start,
            ControlAction::Pause | ControlAction::Home | ControlAction::Program => Command::Pause,
            ControlAction::Reset => Command::Reset,
        }
    }
}

pub struct Session<C> {
    sequencer: IntervalSequencer,
    clock: C,
}

impl<C: ClockSource> Session<C> {
    /// Bind a sequencer to a clock ticking at the sequence's resolution.
    pub fn new(sequencer: IntervalSequencer, clock: C) -> crate::Result<Self> {
        if let Some(config) = sequencer.config() {
            Self::check_resolution(&clock, config)?;
        }
        Ok(Self { sequencer, clock })
    }

    pub fn sequencer(&self) -> &IntervalSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut IntervalSequencer {
        &mut self.sequencer
    }

    /// Run until `Shutdown` arrives or every command sender is dropped.
    /// Observer channels are closed on the way out. Returns the sequencer
    /// in whatever state it reached.
    pub async fn run(mut self, mut commands: UnboundedReceiver<Command>) -> IntervalSequencer {
        loop {
            let Session { sequencer, clock } = &mut self;
            let running = sequencer.is_running();
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => Self::apply(sequencer, clock, command),
                },
                tick = clock.next_tick(), if running => match tick {
                    Ok(()) => {
                        sequencer.tick();
                    }
                    Err(error) => {
                        sequencer.fail(error.into());
                    }
                },
            }
        }
        debug!(status = ?self.sequencer.status(), "Session ended");
        self.sequencer.close_subscriptions();
        self.sequencer
    }

    fn apply(sequencer: &mut IntervalSequencer, clock: &mut C, command: Command) {
        debug!(?command, "Session command");
        match command {
            Command::Start => match sequencer.start() {
                Ok(Some(Event::SequenceStarted { resumed: true, .. })) => clock.resume(),
                Ok(Some(_)) => clock.restart(),
                Ok(None) => {}
                Err(error) => warn!(%error, "Start rejected"),
            },
            Command::Pause => {
                sequencer.pause();
            }
            Command::Reset => {
                if let Err(error) = sequencer.reset() {
                    warn!(%error, "Reset rejected");
                }
            }
            Command::Rebuild(config) => {
                if let Err(error) = Self::check_resolution(clock, &config) {
                    warn!(%error, "Rebuild rejected");
                    return;
                }
                if let Err(error) = sequencer.build(config) {
                    warn!(%error, "Rebuild rejected");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn check_resolution(clock: &C, config: &SequenceConfig) -> Result<(), SequenceError> {
        if clock.resolution() != config.resolution {
            return Err(ClockError::ResolutionMismatch {
                clock: clock.resolution(),
                sequence: config.resolution,
            }
            .into());
        }
        Ok(())
    }
}

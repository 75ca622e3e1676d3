//! Interval sequencer.
//!
//! Runs a workout as an ordered list of phases (optional countdown, then
//! active/rest per interval), funnelling each phase through a fresh
//! [`CountdownEngine`]. Like the countdown engine it has no internal
//! thread: the session driver calls `tick()` each time the clock fires.
//!
//! ## State Transitions
//!
//! ```text
//! Uninitialized -> Loaded -> Running <-> Paused
//!                             Running -> Completed | Error
//! any built state -> reset -> Loaded
//! ```
//!
//! The interval index advances on the rest -> active boundary, so an active
//! phase and the rest that follows it share an index.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::countdown::{CountdownEngine, TimerConfig};
use super::observer::{Observer, Subscriber, Subscription};
use super::sequence::{Phase, SequenceConfig};
use crate::error::SequenceError;
use crate::events::Event;
use crate::protocol::{time_text, Beep, PhaseKind, StateMask, Status, TickEmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStatus {
    Uninitialized,
    Loaded,
    Running,
    Paused,
    Completed,
    Error,
}

/// Workout sequencer owning at most one countdown engine at a time.
pub struct IntervalSequencer {
    config: Option<SequenceConfig>,
    phases: Vec<Phase>,
    status: SequenceStatus,
    phase_index: usize,
    /// Next tick index within the current phase.
    tick_offset: u64,
    engine: Option<CountdownEngine>,
    state: StateMask,
    /// Remaining tenths in the current phase.
    remaining_tenths: u64,
    remaining_time_text: String,
    subscribers: Vec<Subscriber>,
    next_subscription_id: u64,
}

impl IntervalSequencer {
    pub fn new() -> Self {
        Self {
            config: None,
            phases: Vec::new(),
            status: SequenceStatus::Uninitialized,
            phase_index: 0,
            tick_offset: 0,
            engine: None,
            state: StateMask::LOADED,
            remaining_tenths: 0,
            remaining_time_text: time_text::format_tenths(0),
            subscribers: Vec::new(),
            next_subscription_id: 0,
        }
    }

    pub fn with_config(config: SequenceConfig) -> Result<Self, SequenceError> {
        let mut sequencer = Self::new();
        sequencer.build(config)?;
        Ok(sequencer)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SequenceStatus::Running
    }

    pub fn state_mask(&self) -> StateMask {
        self.state
    }

    pub fn remaining_time_text(&self) -> &str {
        &self.remaining_time_text
    }

    pub fn current_interval(&self) -> u32 {
        self.current_phase().map(|p| p.interval).unwrap_or(1)
    }

    pub fn phase(&self) -> Option<PhaseKind> {
        self.current_phase().map(|p| p.kind)
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn config(&self) -> Option<&SequenceConfig> {
        self.config.as_ref()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Tenths left in the whole workout.
    pub fn total_remaining_tenths(&self) -> u64 {
        self.later_phases_tenths() + self.remaining_tenths
    }

    pub fn total_remaining_text(&self) -> String {
        time_text::format_tenths(self.total_remaining_tenths())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load a workout. Any running engine is discarded; subscriptions stay.
    pub fn build(&mut self, config: SequenceConfig) -> Result<Event, SequenceError> {
        config.validate()?;
        let phases = config.phases();
        for phase in &phases {
            phase.timer_config(config.resolution).validate()?;
        }

        info!(
            phases = phases.len(),
            total_secs = config.total_duration_secs(),
            "Sequence built"
        );
        let event = Event::SequenceBuilt {
            phase_count: phases.len(),
            total_secs: config.total_duration_secs(),
            at: Utc::now(),
        };
        self.phases = phases;
        self.config = Some(config);
        self.load();
        Ok(event)
    }

    /// Begin or resume tick delivery. No-op while already running.
    pub fn start(&mut self) -> Result<Option<Event>, SequenceError> {
        let resumed = match self.status {
            SequenceStatus::Running => return Ok(None),
            SequenceStatus::Loaded => false,
            SequenceStatus::Paused => true,
            from @ (SequenceStatus::Uninitialized
            | SequenceStatus::Completed
            | SequenceStatus::Error) => {
                return Err(SequenceError::InvalidTransition {
                    from,
                    command: "start",
                })
            }
        };

        let phase = self
            .current_phase()
            .copied()
            .ok_or_else(|| SequenceError::EngineFault("sequence has no phases".into()))?;
        self.engine = Some(CountdownEngine::resume_at(
            phase.timer_config(self.resolution()),
            self.tick_offset,
        )?);
        self.status = SequenceStatus::Running;

        info!(
            phase_index = self.phase_index,
            phase = ?phase.kind,
            interval = phase.interval,
            tick_offset = self.tick_offset,
            resumed,
            "Sequence running"
        );
        Ok(Some(Event::SequenceStarted {
            phase_index: self.phase_index,
            phase: phase.kind,
            current_interval: phase.interval,
            remaining_time_text: self.remaining_time_text.clone(),
            resumed,
            at: Utc::now(),
        }))
    }

    /// Suspend tick delivery. The engine is released; the phase position is
    /// kept so `start()` continues from the next tick.
    pub fn pause(&mut self) -> Option<Event> {
        if self.status != SequenceStatus::Running {
            return None;
        }
        self.engine = None;
        self.status = SequenceStatus::Paused;
        info!(
            phase_index = self.phase_index,
            remaining = %self.remaining_time_text,
            "Sequence paused"
        );
        Some(Event::SequencePaused {
            phase_index: self.phase_index,
            remaining_time_text: self.remaining_time_text.clone(),
            at: Utc::now(),
        })
    }

    /// Return to Loaded from any built state.
    pub fn reset(&mut self) -> Result<Event, SequenceError> {
        if self.status == SequenceStatus::Uninitialized {
            return Err(SequenceError::InvalidTransition {
                from: self.status,
                command: "reset",
            });
        }
        self.load();
        info!("Sequence reset");
        Ok(Event::SequenceReset { at: Utc::now() })
    }

    /// Drive the sequence into the terminal Error state and notify
    /// observers once. Ignored unless running or paused.
    pub fn fail(&mut self, error: SequenceError) -> Option<Event> {
        if !matches!(
            self.status,
            SequenceStatus::Running | SequenceStatus::Paused
        ) {
            debug!(status = ?self.status, %error, "Ignoring fault outside a run");
            return None;
        }

        warn!(%error, phase_index = self.phase_index, "Sequence failed");
        self.engine = None;
        self.status = SequenceStatus::Error;
        self.state = StateMask::ERROR;
        for subscriber in &mut self.subscribers {
            subscriber.observer.on_error(&error);
        }
        self.subscribers.clear();
        Some(Event::SequenceFailed {
            message: error.to_string(),
            at: Utc::now(),
        })
    }

    /// Compute and deliver the next tick. Returns `None` unless running.
    pub fn tick(&mut self) -> Option<TickEmission> {
        if self.status != SequenceStatus::Running {
            return None;
        }

        let emission = match self.advance() {
            Ok(emission) => emission,
            Err(error) => {
                self.fail(error);
                return None;
            }
        };

        self.state = emission.state;
        self.remaining_tenths = emission.remaining_tenths;
        self.remaining_time_text = emission.remaining_time_text.clone();
        for subscriber in &mut self.subscribers {
            subscriber.observer.on_emission(&emission);
        }
        if emission.is_completed() {
            self.complete();
        }
        Some(emission)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: impl Observer + 'static) -> Subscription {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.subscribers.push(Subscriber {
            id,
            observer: Box::new(observer),
        });
        debug!(subscription = id, "Observer subscribed");
        Subscription { id }
    }

    /// Detach an observer. Idempotent. Dropping the last observer of a
    /// running sequence pauses it and releases the engine.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != subscription.id);
        let removed = self.subscribers.len() < before;
        if removed {
            debug!(subscription = subscription.id, "Observer unsubscribed");
            if self.subscribers.is_empty() {
                self.pause();
            }
        }
        removed
    }

    /// Drop every observer without a terminal notification, closing their
    /// channels. The sequencer state is left as is.
    pub fn close_subscriptions(&mut self) {
        if !self.subscribers.is_empty() {
            debug!(count = self.subscribers.len(), "Closing subscriptions");
        }
        self.subscribers.clear();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn current_phase(&self) -> Option<&Phase> {
        self.phases.get(self.phase_index)
    }

    fn later_phases_tenths(&self) -> u64 {
        self.phases
            .iter()
            .skip(self.phase_index + 1)
            .map(Phase::duration_tenths)
            .sum()
    }

    fn resolution(&self) -> u32 {
        self.config
            .as_ref()
            .map(|c| c.resolution)
            .unwrap_or(TimerConfig::DEFAULT_RESOLUTION)
    }

    fn load(&mut self) {
        self.status = SequenceStatus::Loaded;
        self.phase_index = 0;
        self.tick_offset = 0;
        self.engine = None;
        self.state = StateMask::LOADED;
        self.remaining_tenths = self
            .phases
            .first()
            .map(Phase::duration_tenths)
            .unwrap_or(0);
        self.remaining_time_text = time_text::format_tenths(self.remaining_tenths);
    }

    fn complete(&mut self) {
        self.status = SequenceStatus::Completed;
        self.engine = None;
        info!("Sequence completed");
        for subscriber in &mut self.subscribers {
            subscriber.observer.on_completed();
        }
        self.subscribers.clear();
    }

    /// Pull the next engine tick, rolling over into the next phase when an
    /// intermediate phase hits zero.
    fn advance(&mut self) -> Result<TickEmission, SequenceError> {
        let raw = self.pull()?;
        if !raw.is_completed() || self.phase_index + 1 >= self.phases.len() {
            return Ok(self.decorate(raw));
        }

        self.phase_index += 1;
        self.tick_offset = 0;
        let phase = self.phases[self.phase_index];
        self.engine = Some(CountdownEngine::new(
            phase.timer_config(self.resolution()),
        )?);
        debug!(
            phase_index = self.phase_index,
            phase = ?phase.kind,
            interval = phase.interval,
            "Advanced to next phase"
        );

        let raw = self.pull()?;
        Ok(self.decorate(raw))
    }

    fn pull(&mut self) -> Result<TickEmission, SequenceError> {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| SequenceError::EngineFault("no engine for the running phase".into()))?;
        let emission = engine
            .next()
            .ok_or_else(|| SequenceError::EngineFault("countdown ended without completing".into()))?;
        self.tick_offset += 1;
        Ok(emission)
    }

    fn decorate(&self, mut emission: TickEmission) -> TickEmission {
        let Some(phase) = self.current_phase() else {
            return emission;
        };
        emission.phase = Some(phase.kind);
        emission.total_remaining_text = Some(time_text::format_tenths(
            self.later_phases_tenths() + emission.remaining_tenths,
        ));

        match phase.kind {
            PhaseKind::Countdown => {
                if emission.state.status == Status::Active {
                    emission.state.get_ready = true;
                }
            }
            PhaseKind::Active | PhaseKind::Rest => {
                emission.current_interval = Some(phase.interval);
                emission.remaining_interval_seconds = Some(emission.remaining_seconds());
            }
        }

        if phase.kind == PhaseKind::Active && emission.state.get_ready {
            emission.state.warning = true;
            if emission.state.instant {
                emission.beep = Some(self.beep_for(emission.remaining_tenths));
            }
        }
        emission
    }

    fn beep_for(&self, remaining_tenths: u64) -> Beep {
        let whole_seconds = u32::try_from(remaining_tenths / 10).unwrap_or(u32::MAX);
        let entering = self
            .config
            .as_ref()
            .is_some_and(|c| c.warnings.is_threshold(whole_seconds));
        if entering {
            Beep::DoubleBeep
        } else {
            Beep::SingleBeep
        }
    }
}

impl Default for IntervalSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IntervalSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalSequencer")
            .field("status", &self.status)
            .field("phase_index", &self.phase_index)
            .field("tick_offset", &self.tick_offset)
            .field("state", &self.state)
            .field("remaining_time_text", &self.remaining_time_text)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

//! Tick sources.
//!
//! A clock only says "tick now"; it carries no time value. The sequencer
//! derives remaining time purely from tick counts.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use crate::error::ClockError;

pub trait ClockSource {
    /// Ticks per second.
    fn resolution(&self) -> u32;

    /// Make the next tick fire immediately, then every period after it.
    fn restart(&mut self);

    /// Make the next tick fire one full period from now.
    fn resume(&mut self);

    /// Wait for the next tick.
    fn next_tick(&mut self) -> impl Future<Output = Result<(), ClockError>>;
}

/// Fixed-period clock on the tokio timer.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct IntervalClock {
    resolution: u32,
    interval: Interval,
}

impl IntervalClock {
    pub fn new(resolution: u32) -> Result<Self, ClockError> {
        if resolution == 0 || 1000 % resolution != 0 {
            return Err(ClockError::InvalidResolution(resolution));
        }
        let mut interval = tokio::time::interval(Self::period_for(resolution));
        // Late ticks are delivered one by one, never coalesced.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ok(Self {
            resolution,
            interval,
        })
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    fn period_for(resolution: u32) -> Duration {
        Duration::from_millis(1000 / u64::from(resolution))
    }
}

impl ClockSource for IntervalClock {
    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn restart(&mut self) {
        self.interval.reset_immediately();
    }

    fn resume(&mut self) {
        self.interval.reset();
    }

    async fn next_tick(&mut self) -> Result<(), ClockError> {
        self.interval.tick().await;
        Ok(())
    }
}

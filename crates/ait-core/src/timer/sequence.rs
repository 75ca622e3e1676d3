use serde::{Deserialize, Serialize};

use super::countdown::{validate_resolution, TimerConfig};
use crate::error::SequenceError;
use crate::protocol::{time_text, PhaseKind};

/// Audible warnings before the end of an active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Warnings {
    #[serde(default)]
    pub at_5s: bool,
    #[serde(default)]
    pub at_10s: bool,
    #[serde(default)]
    pub at_15s: bool,
}

impl Warnings {
    pub fn none() -> Self {
        Self::default()
    }

    /// Enabled thresholds in seconds, largest first.
    pub fn thresholds(&self) -> Vec<u32> {
        [(15, self.at_15s), (10, self.at_10s), (5, self.at_5s)]
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(secs, _)| secs)
            .collect()
    }

    pub fn is_threshold(&self, seconds: u32) -> bool {
        self.thresholds().contains(&seconds)
    }

    /// Largest enabled threshold strictly inside a phase of `duration_seconds`.
    pub fn window_for(&self, duration_seconds: u32) -> u32 {
        self.thresholds()
            .into_iter()
            .find(|secs| *secs < duration_seconds)
            .unwrap_or(0)
    }
}

/// Input to a full workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Get-ready countdown before the first interval. Zero skips it.
    #[serde(default)]
    pub countdown_seconds: u32,
    pub interval_count: u32,
    pub active_seconds: u32,
    /// Zero skips the rest phases.
    #[serde(default)]
    pub rest_seconds: u32,
    #[serde(default)]
    pub warnings: Warnings,
    #[serde(default = "default_resolution")]
    pub resolution: u32,
}

fn default_resolution() -> u32 {
    TimerConfig::DEFAULT_RESOLUTION
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 5,
            interval_count: 8,
            active_seconds: 20,
            rest_seconds: 10,
            warnings: Warnings {
                at_5s: true,
                at_10s: false,
                at_15s: false,
            },
            resolution: default_resolution(),
        }
    }
}

impl SequenceConfig {
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.interval_count < 1 {
            return Err(SequenceError::invalid_config(
                "interval_count",
                "must be at least 1",
            ));
        }
        if self.active_seconds == 0 {
            return Err(SequenceError::invalid_config(
                "active_seconds",
                "must be greater than zero",
            ));
        }
        validate_resolution(self.resolution)
    }

    /// Full workout length in seconds.
    ///
    /// Uses saturating arithmetic so absurd configs cannot overflow.
    pub fn total_duration_secs(&self) -> u64 {
        let per_interval = u64::from(self.active_seconds) + u64::from(self.rest_seconds);
        u64::from(self.countdown_seconds)
            .saturating_add(per_interval.saturating_mul(u64::from(self.interval_count)))
    }

    /// Full workout length as `mm:ss.t`.
    pub fn total_duration_text(&self) -> String {
        time_text::format_seconds(self.total_duration_secs())
    }

    /// Ordered phase layout: countdown, then (active, rest) per interval.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases = Vec::new();
        if self.countdown_seconds > 0 {
            phases.push(Phase {
                kind: PhaseKind::Countdown,
                interval: 1,
                duration_seconds: self.countdown_seconds,
                get_ready_seconds: self.countdown_seconds,
            });
        }
        let warning_window = self.warnings.window_for(self.active_seconds);
        for interval in 1..=self.interval_count {
            phases.push(Phase {
                kind: PhaseKind::Active,
                interval,
                duration_seconds: self.active_seconds,
                get_ready_seconds: warning_window,
            });
            if self.rest_seconds > 0 {
                phases.push(Phase {
                    kind: PhaseKind::Rest,
                    interval,
                    duration_seconds: self.rest_seconds,
                    get_ready_seconds: 0,
                });
            }
        }
        phases
    }
}

/// One contiguous countdown within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// 1-based interval this phase belongs to; the countdown counts as 1.
    pub interval: u32,
    pub duration_seconds: u32,
    pub get_ready_seconds: u32,
}

impl Phase {
    pub fn timer_config(&self, resolution: u32) -> TimerConfig {
        TimerConfig::new(self.duration_seconds, self.get_ready_seconds, resolution)
    }

    pub fn duration_tenths(&self) -> u64 {
        u64::from(self.duration_seconds) * 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(countdown: u32, intervals: u32, active: u32, rest: u32) -> SequenceConfig {
        SequenceConfig {
            countdown_seconds: countdown,
            interval_count: intervals,
            active_seconds: active,
            rest_seconds: rest,
            warnings: Warnings::none(),
            resolution: 10,
        }
    }

    #[test]
    fn layout_alternates_active_and_rest() {
        let kinds: Vec<_> = config(5, 3, 20, 10)
            .phases()
            .iter()
            .map(|p| (p.kind, p.interval))
            .collect();
        assert_eq!(
            kinds,
            [
                (PhaseKind::Countdown, 1),
                (PhaseKind::Active, 1),
                (PhaseKind::Rest, 1),
                (PhaseKind::Active, 2),
                (PhaseKind::Rest, 2),
                (PhaseKind::Active, 3),
                (PhaseKind::Rest, 3),
            ]
        );
    }

    #[test]
    fn zero_countdown_and_rest_are_skipped() {
        let phases = config(0, 2, 30, 0).phases();
        assert_eq!(phases.len(), 2);
        assert!(phases.iter().all(|p| p.kind == PhaseKind::Active));
    }

    #[test]
    fn total_duration() {
        let c = config(5, 3, 20, 10);
        assert_eq!(c.total_duration_secs(), 95);
        assert_eq!(c.total_duration_text(), "01:35.0");
    }

    #[test]
    fn warning_window_uses_largest_threshold_inside_phase() {
        let w = Warnings {
            at_5s: true,
            at_10s: true,
            at_15s: true,
        };
        assert_eq!(w.window_for(20), 15);
        assert_eq!(w.window_for(15), 10);
        assert_eq!(w.window_for(5), 0);
        assert_eq!(Warnings::none().window_for(20), 0);
        assert_eq!(w.thresholds(), [15, 10, 5]);
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert!(config(5, 0, 20, 10).validate().is_err());
        assert!(config(5, 1, 0, 10).validate().is_err());
        let mut c = config(5, 1, 20, 10);
        c.resolution = 4;
        assert!(c.validate().is_err());
        assert!(config(0, 1, 1, 0).validate().is_ok());
    }
}

pub mod config;
pub mod program;
pub mod run;

use clap::Args;

use ait_core::{SequenceConfig, Warnings};

/// Workout overrides shared by `run`, `total` and `program add`.
#[derive(Args, Debug, Default)]
pub struct WorkoutArgs {
    /// Get-ready countdown in seconds (0 disables it)
    #[arg(long)]
    pub countdown: Option<u32>,
    /// Number of active/rest intervals
    #[arg(long)]
    pub intervals: Option<u32>,
    /// Active seconds per interval
    #[arg(long)]
    pub active: Option<u32>,
    /// Rest seconds per interval (0 disables rest)
    #[arg(long)]
    pub rest: Option<u32>,
    /// Warning thresholds in seconds, comma separated (5, 10, 15)
    #[arg(long, value_delimiter = ',')]
    pub warn: Option<Vec<u32>>,
}

impl WorkoutArgs {
    pub fn apply(&self, config: &mut SequenceConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(countdown) = self.countdown {
            config.countdown_seconds = countdown;
        }
        if let Some(intervals) = self.intervals {
            config.interval_count = intervals;
        }
        if let Some(active) = self.active {
            config.active_seconds = active;
        }
        if let Some(rest) = self.rest {
            config.rest_seconds = rest;
        }
        if let Some(thresholds) = &self.warn {
            config.warnings = parse_warnings(thresholds)?;
        }
        config.validate()?;
        Ok(())
    }
}

fn parse_warnings(thresholds: &[u32]) -> Result<Warnings, Box<dyn std::error::Error>> {
    let mut warnings = Warnings::none();
    for secs in thresholds {
        match secs {
            0 => {}
            5 => warnings.at_5s = true,
            10 => warnings.at_10s = true,
            15 => warnings.at_15s = true,
            other => return Err(format!("unsupported warning threshold: {other}s").into()),
        }
    }
    Ok(warnings)
}

use clap::Subcommand;
use ait_core::{Config, IntervalRecord, SequenceConfig};

use super::WorkoutArgs;

#[derive(Subcommand)]
pub enum ProgramAction {
    /// List saved programs
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a new program built from the default workout plus overrides
    Add {
        /// Program name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        workout: WorkoutArgs,
    },
    /// Remove a saved program
    Remove {
        /// Program uuid
        uuid: String,
    },
}

pub fn run(action: ProgramAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProgramAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.programs)?);
                return Ok(());
            }
            for program in &config.programs {
                let marker = if program.uuid == config.current_uuid { "*" } else { " " };
                let total = program
                    .to_sequence_config(config.timer.resolution)
                    .map(|c| c.total_duration_text())
                    .unwrap_or_else(|_| "invalid".into());
                println!(
                    "{marker} {}  {}  {}x {}s/{}s  total {total}",
                    program.uuid,
                    program.name,
                    program.intervals,
                    program.activerest.upper,
                    program.activerest.lower
                );
            }
        }
        ProgramAction::Add { name, workout } => {
            let mut config = Config::load()?;
            let mut sequence = SequenceConfig {
                resolution: config.timer.resolution,
                ..SequenceConfig::default()
            };
            workout.apply(&mut sequence)?;
            let record = IntervalRecord::new(name, &sequence);
            println!("{}", record.uuid);
            config.programs.push(record);
            config.save()?;
        }
        ProgramAction::Remove { uuid } => {
            let mut config = Config::load()?;
            if !config.remove_program(&uuid) {
                return Err(format!("no program with uuid {uuid}").into());
            }
            config.save()?;
            println!("removed {uuid}");
        }
    }
    Ok(())
}

use std::io::{BufRead, Write};

use clap::Args;
use tokio::sync::mpsc::{self, UnboundedSender};

use ait_core::storage::{Config, IntervalRecord};
use ait_core::{
    Beep, Command, ControlAction, IntervalClock, IntervalSequencer, Notification, PhaseKind,
    SequenceConfig, Session, TickEmission,
};

use super::WorkoutArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program uuid (defaults to the last opened program)
    #[arg(long)]
    pub program: Option<String>,
    #[command(flatten)]
    pub workout: WorkoutArgs,
    /// Print every tick as a JSON line
    #[arg(long)]
    pub json: bool,
    /// Do not read s/p/r/q controls from stdin
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args, Debug)]
pub struct TotalArgs {
    /// Program uuid (defaults to the last opened program)
    #[arg(long)]
    pub program: Option<String>,
    #[command(flatten)]
    pub workout: WorkoutArgs,
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

/// Open the program and apply command-line overrides.
async fn open_workout(
    config: &mut Config,
    program: Option<&str>,
    workout: &WorkoutArgs,
) -> Result<(IntervalRecord, SequenceConfig), Box<dyn std::error::Error>> {
    let (record, mut sequence) = config.open_program(program).await?;
    workout.apply(&mut sequence)?;
    Ok((record, sequence))
}

pub fn total(args: TotalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    let (record, sequence) = runtime()?.block_on(open_workout(
        &mut config,
        args.program.as_deref(),
        &args.workout,
    ))?;
    println!("{}: {}", record.name, sequence.total_duration_text());
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    let rt = runtime()?;
    let (record, sequence) = rt.block_on(open_workout(
        &mut config,
        args.program.as_deref(),
        &args.workout,
    ))?;
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Could not remember the current program");
    }

    eprintln!(
        "{} - {} intervals, total {}",
        record.name,
        sequence.interval_count,
        sequence.total_duration_text()
    );
    if !args.no_input {
        eprintln!("controls: s = start, p = pause, r = reset, q = quit");
    }

    let muted = config.signal.muted();
    let interval_count = sequence.interval_count;
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    if !args.no_input {
        spawn_stdin_controls(cmd_tx.clone());
    }

    rt.block_on(async {
        let (note_tx, mut note_rx) = mpsc::unbounded_channel();
        let mut sequencer = IntervalSequencer::with_config(sequence)?;
        sequencer.subscribe(note_tx);
        let session = Session::new(sequencer, IntervalClock::new(config.timer.resolution)?)?;

        cmd_tx.send(Command::Start)?;
        // Ends when the workout finishes or the session closes the channel
        let display = async {
            while let Some(note) = note_rx.recv().await {
                match note {
                    Notification::Emission(e) if args.json => {
                        println!("{}", serde_json::to_string(&e).unwrap_or_default());
                    }
                    Notification::Emission(e) => render(&e, interval_count, muted),
                    Notification::Completed => {
                        let bell = if muted { "" } else { "\x07\x07\x07" };
                        eprintln!("{bell}\nworkout complete");
                        break;
                    }
                    Notification::Error { message } => {
                        eprintln!("\nworkout stopped: {message}");
                        break;
                    }
                }
            }
            let _ = cmd_tx.send(Command::Shutdown);
        };

        let (sequencer, ()) = tokio::join!(session.run(cmd_rx), display);
        tracing::debug!(status = ?sequencer.status(), "Workout finished");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Terminal bells for one tick: the warning beep, or a single cue when a
/// phase starts.
fn bells(emission: &TickEmission, muted: bool) -> &'static str {
    if muted {
        return "";
    }
    match emission.beep {
        Some(Beep::DoubleBeep) => "\x07\x07",
        Some(Beep::SingleBeep) => "\x07",
        None if emission.state.start => "\x07",
        None => "",
    }
}

fn render(emission: &TickEmission, interval_count: u32, muted: bool) {
    let label = match emission.phase {
        Some(PhaseKind::Countdown) | None => "get ready".to_string(),
        Some(PhaseKind::Active) => format!(
            "active {}/{}",
            emission.current_interval.unwrap_or(1),
            interval_count
        ),
        Some(PhaseKind::Rest) => format!(
            "rest   {}/{}",
            emission.current_interval.unwrap_or(1),
            interval_count
        ),
    };
    let marker = if emission.state.warning { " !" } else { "" };
    let total = emission.total_remaining_text.as_deref().unwrap_or("");

    let mut stderr = std::io::stderr().lock();
    let _ = write!(
        stderr,
        "\r{label:<14} {}{marker:<2}  total {total}  [{:<15}]{}",
        emission.remaining_time_text,
        emission.state.view().to_string(),
        bells(emission, muted)
    );
    let _ = stderr.flush();
}

/// Map single-letter lines on stdin to control-surface buttons.
fn spawn_stdin_controls(commands: UnboundedSender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let action = match line.trim() {
                "s" => ControlAction::Start,
                "p" => ControlAction::Pause,
                "r" => ControlAction::Reset,
                "h" => ControlAction::Home,
                "q" => {
                    let _ = commands.send(Command::Shutdown);
                    break;
                }
                _ => continue,
            };
            if commands.send(action.command()).is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ait_core::StateMask;

    fn tick(state: StateMask, beep: Option<Beep>) -> TickEmission {
        TickEmission {
            state,
            remaining_time_text: "00:05.0".into(),
            remaining_tenths: 50,
            phase: Some(PhaseKind::Active),
            current_interval: Some(1),
            remaining_interval_seconds: Some(5.0),
            beep,
            total_remaining_text: None,
        }
    }

    #[test]
    fn phase_start_rings_once() {
        assert_eq!(bells(&tick(StateMask::ACTIVE_START, None), false), "\x07");
    }

    #[test]
    fn warning_beeps_ring() {
        let state = StateMask::ACTIVE_GET_READY_INSTANT;
        assert_eq!(bells(&tick(state, Some(Beep::DoubleBeep)), false), "\x07\x07");
        assert_eq!(bells(&tick(state, Some(Beep::SingleBeep)), false), "\x07");
        assert_eq!(bells(&tick(StateMask::ACTIVE, None), false), "");
    }

    #[test]
    fn muted_never_rings() {
        assert_eq!(bells(&tick(StateMask::ACTIVE_START, None), true), "");
        let state = StateMask::ACTIVE_GET_READY_INSTANT;
        assert_eq!(bells(&tick(state, Some(Beep::DoubleBeep)), true), "");
    }
}

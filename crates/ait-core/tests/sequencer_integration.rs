//! Integration tests for the interval sequencer.

use ait_core::protocol::time_text;
use ait_core::{
    Beep, IntervalSequencer, Notification, PhaseKind, SequenceConfig, SequenceError,
    SequenceStatus, StateMask, TickEmission, Warnings,
};
use tokio::sync::mpsc;

fn workout(countdown: u32, intervals: u32, active: u32, rest: u32, warnings: Warnings) -> SequenceConfig {
    SequenceConfig {
        countdown_seconds: countdown,
        interval_count: intervals,
        active_seconds: active,
        rest_seconds: rest,
        warnings,
        resolution: 10,
    }
}

fn run_to_end(seq: &mut IntervalSequencer) -> Vec<TickEmission> {
    seq.start().unwrap();
    std::iter::from_fn(|| seq.tick()).collect()
}

#[test]
fn test_full_workout_layout() {
    let mut seq = IntervalSequencer::with_config(workout(5, 3, 20, 10, Warnings::none())).unwrap();
    let emissions = run_to_end(&mut seq);

    assert_eq!(emissions.len(), (5 + 3 * 30) * 10 + 1);

    // Get-ready countdown comes first
    assert!(emissions[..50]
        .iter()
        .all(|e| e.phase == Some(PhaseKind::Countdown) && e.state.get_ready));

    // Collapse consecutive ticks into phases
    let mut layout: Vec<(PhaseKind, Option<u32>)> = Vec::new();
    for e in &emissions {
        let key = (e.phase.unwrap(), e.current_interval);
        if layout.last() != Some(&key) {
            layout.push(key);
        }
    }
    assert_eq!(
        layout,
        [
            (PhaseKind::Countdown, None),
            (PhaseKind::Active, Some(1)),
            (PhaseKind::Rest, Some(1)),
            (PhaseKind::Active, Some(2)),
            (PhaseKind::Rest, Some(2)),
            (PhaseKind::Active, Some(3)),
            (PhaseKind::Rest, Some(3)),
        ]
    );

    // Interval index never goes backwards
    let indices: Vec<u32> = emissions.iter().filter_map(|e| e.current_interval).collect();
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    assert!(indices.iter().all(|i| (1..=3).contains(i)));

    let last = emissions.last().unwrap();
    assert_eq!(last.state, StateMask::COMPLETED);
    assert_eq!(last.remaining_time_text, "00:00.0");
    assert_eq!(emissions.iter().filter(|e| e.is_completed()).count(), 1);
    assert_eq!(seq.status(), SequenceStatus::Completed);
}

#[test]
fn test_remaining_text_strictly_decreases_within_phase() {
    let mut seq = IntervalSequencer::with_config(workout(3, 2, 4, 2, Warnings::none())).unwrap();
    let emissions = run_to_end(&mut seq);

    for pair in emissions.windows(2) {
        if pair[1].state.start {
            continue;
        }
        let earlier = time_text::parse_tenths(&pair[0].remaining_time_text).unwrap();
        let later = time_text::parse_tenths(&pair[1].remaining_time_text).unwrap();
        assert!(later < earlier, "{} -> {}", pair[0].remaining_time_text, pair[1].remaining_time_text);
    }
}

#[test]
fn test_pause_then_start_loses_no_time() {
    let mut seq = IntervalSequencer::with_config(workout(5, 2, 20, 10, Warnings::none())).unwrap();
    seq.start().unwrap();
    for _ in 0..37 {
        seq.tick();
    }
    let before = seq.remaining_time_text().to_string();

    seq.pause().unwrap();
    assert_eq!(seq.status(), SequenceStatus::Paused);
    assert_eq!(seq.remaining_time_text(), before);
    assert!(seq.tick().is_none());

    let event = seq.start().unwrap();
    assert!(event.is_some());
    assert_eq!(seq.remaining_time_text(), before);

    let next = seq.tick().unwrap();
    let before_tenths = time_text::parse_tenths(&before).unwrap();
    let next_tenths = time_text::parse_tenths(&next.remaining_time_text).unwrap();
    assert_eq!(before_tenths - next_tenths, 1);
}

#[test]
fn test_paused_run_matches_uninterrupted_run() {
    let config = workout(2, 2, 6, 3, Warnings {
        at_5s: true,
        at_10s: false,
        at_15s: false,
    });

    let mut reference = IntervalSequencer::with_config(config.clone()).unwrap();
    let expected = run_to_end(&mut reference);

    // Pause at awkward spots: mid phase, right after a rollover, inside a warning window
    let pause_points = [1usize, 20, 21, 57, 80, 129];
    let mut seq = IntervalSequencer::with_config(config).unwrap();
    seq.start().unwrap();
    let mut actual = Vec::new();
    while let Some(e) = seq.tick() {
        actual.push(e);
        if pause_points.contains(&actual.len()) {
            seq.pause().unwrap();
            seq.start().unwrap();
        }
    }

    assert_eq!(actual, expected);
}

#[test]
fn test_reset_from_every_state() {
    let config = workout(1, 3, 2, 1, Warnings::none());

    // Loaded
    let mut seq = IntervalSequencer::with_config(config.clone()).unwrap();
    seq.reset().unwrap();
    assert_loaded(&seq);

    // Running, past the first interval
    seq.start().unwrap();
    for _ in 0..45 {
        seq.tick();
    }
    assert_eq!(seq.current_interval(), 2);
    seq.reset().unwrap();
    assert_loaded(&seq);

    // Paused
    seq.start().unwrap();
    seq.tick();
    seq.pause().unwrap();
    seq.reset().unwrap();
    assert_loaded(&seq);

    // Completed
    run_to_end(&mut seq);
    assert_eq!(seq.status(), SequenceStatus::Completed);
    seq.reset().unwrap();
    assert_loaded(&seq);

    // Error
    seq.start().unwrap();
    seq.tick();
    seq.fail(SequenceError::EngineFault("clock gone".into()));
    assert_eq!(seq.status(), SequenceStatus::Error);
    seq.reset().unwrap();
    assert_loaded(&seq);
}

fn assert_loaded(seq: &IntervalSequencer) {
    assert_eq!(seq.status(), SequenceStatus::Loaded);
    assert_eq!(seq.state_mask(), StateMask::LOADED);
    assert_eq!(seq.current_interval(), 1);
    assert!(!seq.has_engine());
}

#[test]
fn test_warning_beeps_for_ten_and_five_seconds() {
    let warnings = Warnings {
        at_5s: true,
        at_10s: true,
        at_15s: false,
    };
    let mut seq = IntervalSequencer::with_config(workout(0, 1, 20, 0, warnings)).unwrap();
    let emissions = run_to_end(&mut seq);

    let doubles: Vec<&str> = emissions
        .iter()
        .filter(|e| e.beep == Some(Beep::DoubleBeep))
        .map(|e| e.remaining_time_text.as_str())
        .collect();
    assert_eq!(doubles, ["00:10.0", "00:05.0"]);

    let singles: Vec<&str> = emissions
        .iter()
        .filter(|e| e.beep == Some(Beep::SingleBeep))
        .map(|e| e.remaining_time_text.as_str())
        .collect();
    assert_eq!(
        singles,
        ["00:09.0", "00:08.0", "00:07.0", "00:06.0", "00:04.0", "00:03.0", "00:02.0", "00:01.0"]
    );

    // Warning covers the whole window and nothing before it
    for e in &emissions {
        let in_window = e.remaining_tenths <= 100 && !e.is_completed();
        assert_eq!(e.state.warning, in_window, "at {}", e.remaining_time_text);
    }
}

#[test]
fn test_warnings_repeat_per_active_phase_only() {
    let warnings = Warnings {
        at_5s: true,
        at_10s: true,
        at_15s: false,
    };
    let mut seq = IntervalSequencer::with_config(workout(10, 3, 20, 15, warnings)).unwrap();
    let emissions = run_to_end(&mut seq);

    let doubles = emissions
        .iter()
        .filter(|e| e.beep == Some(Beep::DoubleBeep))
        .count();
    assert_eq!(doubles, 6);
    assert!(emissions
        .iter()
        .filter(|e| e.phase != Some(PhaseKind::Active))
        .all(|e| e.beep.is_none() && !e.state.warning));
}

#[test]
fn test_threshold_equal_to_active_duration_is_ignored() {
    let warnings = Warnings {
        at_5s: false,
        at_10s: false,
        at_15s: true,
    };
    let mut seq = IntervalSequencer::with_config(workout(0, 1, 15, 0, warnings)).unwrap();
    let emissions = run_to_end(&mut seq);
    assert!(emissions.iter().all(|e| e.beep.is_none()));
}

#[test]
fn test_channel_observer_sees_every_tick_in_order() {
    let mut seq = IntervalSequencer::with_config(workout(1, 1, 2, 1, Warnings::none())).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    seq.subscribe(tx);
    let emitted = run_to_end(&mut seq);

    let mut delivered = Vec::new();
    let mut completed = 0;
    while let Ok(n) = rx.try_recv() {
        match n {
            Notification::Emission(e) => delivered.push(e.remaining_time_text),
            Notification::Completed => completed += 1,
            Notification::Error { message } => panic!("unexpected error: {message}"),
        }
    }
    let expected: Vec<_> = emitted.into_iter().map(|e| e.remaining_time_text).collect();
    assert_eq!(delivered, expected);
    assert_eq!(completed, 1);
}

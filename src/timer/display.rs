//! Smooth display derivation between authoritative snapshots.
//!
//! The backend updates as coarsely as once per second; the UI redraws every
//! frame. `SmoothCountdown` bridges the two by extrapolating from the last
//! authoritative value and a monotonic-clock delta, snapping the baseline the
//! moment a new value arrives. No easing is applied, so visible drift is
//! bounded by one tick interval.

use std::time::Instant;

use tokio::sync::watch;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::timer::{TimerMode, TimerSnapshot};

/// The authoritative inputs the display depends on. Countdown and break modes
/// feed `remaining_ms`; stopwatch feeds `active_ms` and counts up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInput {
    pub value_ms: u64,
    pub is_running: bool,
    pub counts_up: bool,
}

impl DisplayInput {
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        let counts_up = snapshot.state.mode.counts_up();
        let value_ms = match snapshot.state.mode {
            TimerMode::Countdown | TimerMode::Break => snapshot.remaining_ms.max(0) as u64,
            TimerMode::Stopwatch => snapshot.state.active_ms,
        };
        Self {
            value_ms,
            is_running: snapshot.state.is_running(),
            counts_up,
        }
    }
}

/// Baseline-and-extrapolate core. Pure: callers inject `Instant`s, which is
/// also what makes the arithmetic testable without a clock.
#[derive(Debug, Default)]
pub struct SmoothCountdown {
    input: Option<DisplayInput>,
    baseline_at: Option<Instant>,
}

impl SmoothCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-baselines if the authoritative input changed. Heartbeats that carry
    /// a genuinely new value land here too and correct accumulated drift.
    pub fn observe(&mut self, input: DisplayInput, now: Instant) {
        if self.input != Some(input) {
            self.input = Some(input);
            self.baseline_at = Some(now);
        }
    }

    /// The value to render at `now`. Extrapolates only while running; when
    /// stopped or idle the authoritative value is shown as-is.
    pub fn display_ms(&self, now: Instant) -> u64 {
        let (Some(input), Some(baseline_at)) = (self.input, self.baseline_at) else {
            return 0;
        };

        if !input.is_running {
            return input.value_ms;
        }

        let elapsed = now.saturating_duration_since(baseline_at).as_millis() as u64;
        if input.counts_up {
            input.value_ms.saturating_add(elapsed)
        } else {
            input.value_ms.saturating_sub(elapsed)
        }
    }
}

/// Spawns the frame driver: observes the snapshot feed, recomputes the
/// display value on every tick, and publishes it on a watch channel. The
/// loop exits on cancellation or when the snapshot feed closes.
pub fn spawn_display_loop(
    mut snapshots: watch::Receiver<Option<TimerSnapshot>>,
    tick: Duration,
    cancel: CancellationToken,
) -> watch::Receiver<u64> {
    let (display_tx, display_rx) = watch::channel(0u64);

    tokio::spawn(async move {
        let mut countdown = SmoothCountdown::new();
        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if let Some(snapshot) = snapshots.borrow_and_update().as_ref() {
            countdown.observe(DisplayInput::from_snapshot(snapshot), Instant::now());
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Some(snapshot) = snapshots.borrow_and_update().as_ref() {
                        countdown.observe(DisplayInput::from_snapshot(snapshot), Instant::now());
                    }
                }
                _ = interval.tick() => {
                    let value = countdown.display_ms(Instant::now());
                    display_tx.send_if_modified(|current| {
                        if *current != value {
                            *current = value;
                            true
                        } else {
                            false
                        }
                    });
                }
            }
        }
    });

    display_rx
}

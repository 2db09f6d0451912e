//! In-process reference backend.
//!
//! Implements the full command/event surface with the real timer state
//! machine semantics (idle to running on start, auto-stop at zero for
//! counting-down modes, periodic heartbeats) but without persistence or
//! sensing. Integration tests and demos run the frontend core against this
//! instead of the native process.

use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Duration, MissedTickBehavior};
use uuid::Uuid;

use crate::settings::CoreSettings;
use crate::timer::{
    SessionInfo, SessionStatus, TimerMode, TimerSnapshot, TimerState, TimerStatus,
};

use super::{BackendHandle, BackendRequest, TimerEvent};

/// Backend-side timer state machine. Unlike the wire-facing `TimerState`,
/// this carries the monotonic anchor that active time accrues against.
struct Clock {
    state: TimerState,
    baseline_ms: u64,
    anchor: Option<Instant>,
}

impl Clock {
    fn new() -> Self {
        Self {
            state: TimerState::default(),
            baseline_ms: 0,
            anchor: None,
        }
    }

    fn current_active_ms(&self) -> u64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.state.status, self.anchor) {
            self.baseline_ms
                .saturating_add(anchor.elapsed().as_millis() as u64)
        } else {
            self.state.active_ms
        }
    }

    fn sync_active_from_anchor(&mut self) {
        if let (TimerStatus::Running, Some(anchor)) = (self.state.status, self.anchor) {
            self.state.active_ms = self
                .baseline_ms
                .saturating_add(anchor.elapsed().as_millis() as u64);
        }
    }

    fn remaining_ms(&self) -> i64 {
        match (self.state.status, self.state.mode) {
            (TimerStatus::Idle | TimerStatus::Stopped, _) => 0,
            (TimerStatus::Running, TimerMode::Countdown | TimerMode::Break) => {
                let remaining = self.state.target_ms as i64 - self.current_active_ms() as i64;
                remaining.max(0)
            }
            (TimerStatus::Running, TimerMode::Stopwatch) => self.current_active_ms() as i64,
        }
    }

    fn snapshot(&mut self) -> TimerSnapshot {
        self.sync_active_from_anchor();
        TimerSnapshot {
            remaining_ms: self.remaining_ms(),
            state: self.state.clone(),
        }
    }

    fn begin_session(&mut self, session_id: String, target_ms: u64, mode: TimerMode) {
        self.state = TimerState {
            status: TimerStatus::Running,
            mode,
            session_id: Some(session_id),
            target_ms,
            active_ms: 0,
            started_at: Some(Utc::now()),
        };
        self.baseline_ms = 0;
        self.anchor = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.sync_active_from_anchor();
        self.state.status = TimerStatus::Stopped;
        self.anchor = None;
        self.baseline_ms = self.state.active_ms;
    }

    fn reset(&mut self) {
        self.state = TimerState::default();
        self.baseline_ms = 0;
        self.anchor = None;
    }
}

pub struct LocalBackend;

impl LocalBackend {
    /// Spawns the backend loop and returns the client handle. The loop ends
    /// when every `BackendHandle` clone has been dropped.
    pub fn spawn(settings: &CoreSettings) -> BackendHandle {
        let (request_tx, request_rx) = mpsc::channel(16);
        let (event_tx, _) = broadcast::channel(settings.event_capacity);
        let handle = BackendHandle::new(request_tx, event_tx.clone());

        let tick_interval = Duration::from_millis(settings.backend_tick_ms.max(1));
        let heartbeat_every = settings.heartbeat_every_ticks.max(1);

        tokio::spawn(run_backend(
            request_rx,
            event_tx,
            tick_interval,
            heartbeat_every,
        ));

        handle
    }
}

async fn run_backend(
    mut requests: mpsc::Receiver<BackendRequest>,
    events: broadcast::Sender<TimerEvent>,
    tick_interval: Duration,
    heartbeat_every: u32,
) {
    let mut clock = Clock::new();
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                handle_request(&mut clock, &events, request);
            }
            _ = interval.tick() => {
                if clock.state.status != TimerStatus::Running {
                    continue;
                }

                let snapshot = clock.snapshot();

                // Only counting-down modes auto-stop at zero; a stopwatch
                // runs until ended explicitly.
                if snapshot.remaining_ms <= 0 && !snapshot.state.mode.counts_up() {
                    clock.stop();
                    clock.state.active_ms = clock.state.active_ms.min(clock.state.target_ms);
                    clock.baseline_ms = clock.state.active_ms;
                    emit_state_changed(&events, clock.snapshot());
                    continue;
                }

                ticks = ticks.wrapping_add(1);
                if ticks % heartbeat_every == 0 {
                    let _ = events.send(TimerEvent::Heartbeat(snapshot));
                }
            }
        }
    }

    info!("local timer backend shutting down");
}

fn handle_request(
    clock: &mut Clock,
    events: &broadcast::Sender<TimerEvent>,
    request: BackendRequest,
) {
    match request {
        BackendRequest::StartTimer {
            target_ms,
            mode,
            reply,
        } => {
            let result = start_timer(clock, events, target_ms, mode);
            let _ = reply.send(result);
        }
        BackendRequest::EndTimer { reply } => {
            let _ = reply.send(end_timer(clock, events));
        }
        BackendRequest::CancelTimer { reply } => {
            let _ = reply.send(cancel_timer(clock, events));
        }
        BackendRequest::GetTimerState { reply } => {
            let _ = reply.send(Ok(clock.snapshot()));
        }
    }
}

fn start_timer(
    clock: &mut Clock,
    events: &broadcast::Sender<TimerEvent>,
    target_ms: u64,
    mode: TimerMode,
) -> Result<(), String> {
    if !mode.counts_up() && target_ms == 0 {
        return Err("target_ms must be greater than zero for countdown mode".to_string());
    }
    if clock.state.status != TimerStatus::Idle {
        return Err("timer already active".to_string());
    }

    let session_id = Uuid::new_v4().to_string();
    info!("starting {:?} session {} ({target_ms}ms)", mode, session_id);
    clock.begin_session(session_id, target_ms, mode);
    emit_state_changed(events, clock.snapshot());
    Ok(())
}

fn end_timer(
    clock: &mut Clock,
    events: &broadcast::Sender<TimerEvent>,
) -> Result<SessionInfo, String> {
    if clock.state.status == TimerStatus::Idle {
        return Err("no active session to end".to_string());
    }

    clock.sync_active_from_anchor();
    let session_id = clock
        .state
        .session_id
        .clone()
        .ok_or_else(|| "missing session id".to_string())?;
    let stopped_at = Utc::now();
    let started_at = clock.state.started_at.unwrap_or(stopped_at);
    let active_ms = if clock.state.mode.counts_up() {
        clock.current_active_ms()
    } else {
        clock.current_active_ms().min(clock.state.target_ms)
    };

    let info = SessionInfo {
        id: session_id,
        started_at,
        stopped_at: Some(stopped_at),
        status: SessionStatus::Completed,
        target_ms: clock.state.target_ms,
        active_ms,
        label: None,
        note: None,
    };

    clock.reset();
    emit_state_changed(events, clock.snapshot());
    Ok(info)
}

fn cancel_timer(
    clock: &mut Clock,
    events: &broadcast::Sender<TimerEvent>,
) -> Result<(), String> {
    if clock.state.status == TimerStatus::Idle {
        return Ok(());
    }

    if let Some(session_id) = clock.state.session_id.as_deref() {
        warn!("cancelling session {session_id}");
    }
    clock.reset();
    emit_state_changed(events, clock.snapshot());
    Ok(())
}

fn emit_state_changed(events: &broadcast::Sender<TimerEvent>, snapshot: TimerSnapshot) {
    let _ = events.send(TimerEvent::StateChanged(snapshot));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_settings() -> CoreSettings {
        CoreSettings {
            backend_tick_ms: 10,
            heartbeat_every_ticks: 2,
            ..CoreSettings::default()
        }
    }

    #[tokio::test]
    async fn start_rejects_zero_countdown_target() {
        let backend = LocalBackend::spawn(&fast_settings());
        let err = backend.start_timer(0, TimerMode::Countdown).await.unwrap_err();
        assert!(err.contains("greater than zero"));
    }

    #[tokio::test]
    async fn start_rejects_double_start() {
        let backend = LocalBackend::spawn(&fast_settings());
        backend.start_timer(60_000, TimerMode::Countdown).await.unwrap();
        let err = backend
            .start_timer(60_000, TimerMode::Countdown)
            .await
            .unwrap_err();
        assert_eq!(err, "timer already active");
    }

    #[tokio::test]
    async fn end_without_session_fails_and_cancel_is_quiet() {
        let backend = LocalBackend::spawn(&fast_settings());
        assert!(backend.end_timer().await.is_err());
        assert!(backend.cancel_timer().await.is_ok());
    }

    #[tokio::test]
    async fn full_run_produces_completed_session() {
        let backend = LocalBackend::spawn(&fast_settings());
        backend.start_timer(60_000, TimerMode::Countdown).await.unwrap();

        let snapshot = backend.get_timer_state().await.unwrap();
        assert_eq!(snapshot.state.status, TimerStatus::Running);
        assert!(snapshot.state.session_id.is_some());

        let info = backend.end_timer().await.unwrap();
        assert_eq!(info.status, SessionStatus::Completed);
        assert_eq!(info.target_ms, 60_000);
        assert!(info.stopped_at.is_some());

        let after = backend.get_timer_state().await.unwrap();
        assert_eq!(after.state.status, TimerStatus::Idle);
        assert_eq!(after.remaining_ms, 0);
    }

    #[tokio::test]
    async fn heartbeats_arrive_while_running() {
        let backend = LocalBackend::spawn(&fast_settings());
        let mut events = backend.subscribe();
        backend.start_timer(60_000, TimerMode::Countdown).await.unwrap();

        let mut saw_heartbeat = false;
        for _ in 0..10 {
            match tokio::time::timeout(Duration::from_millis(200), events.recv()).await {
                Ok(Ok(TimerEvent::Heartbeat(snapshot))) => {
                    assert!(snapshot.state.is_running());
                    saw_heartbeat = true;
                    break;
                }
                Ok(Ok(TimerEvent::StateChanged(_))) => continue,
                _ => break,
            }
        }
        assert!(saw_heartbeat, "expected a heartbeat within the window");
    }
}

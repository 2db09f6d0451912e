//! Command/event surface of the native backend process.
//!
//! The backend is an external collaborator: commands are invoked by name with
//! structured arguments and awaited for a structured result, while push events
//! arrive asynchronously on a broadcast channel. `BackendHandle` is the only
//! way the rest of the crate reaches it.

pub mod local;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::timer::{SessionInfo, TimerMode, TimerSnapshot};

/// Push events delivered to subscribers. Both kinds carry a full snapshot;
/// heartbeats exist purely so consumers can re-baseline against clock drift.
#[derive(Debug, Clone)]
pub enum TimerEvent {
    StateChanged(TimerSnapshot),
    Heartbeat(TimerSnapshot),
}

impl TimerEvent {
    pub fn snapshot(&self) -> &TimerSnapshot {
        match self {
            TimerEvent::StateChanged(snapshot) | TimerEvent::Heartbeat(snapshot) => snapshot,
        }
    }

    pub fn into_snapshot(self) -> TimerSnapshot {
        match self {
            TimerEvent::StateChanged(snapshot) | TimerEvent::Heartbeat(snapshot) => snapshot,
        }
    }
}

/// One command envelope per backend operation, each with a reply slot.
/// Failures cross this boundary as human-readable strings.
#[derive(Debug)]
pub enum BackendRequest {
    StartTimer {
        target_ms: u64,
        mode: TimerMode,
        reply: oneshot::Sender<Result<(), String>>,
    },
    EndTimer {
        reply: oneshot::Sender<Result<SessionInfo, String>>,
    },
    CancelTimer {
        reply: oneshot::Sender<Result<(), String>>,
    },
    GetTimerState {
        reply: oneshot::Sender<Result<TimerSnapshot, String>>,
    },
}

/// Cloneable client handle: a request sender plus the event subscription
/// point. Dropping the backend side surfaces as command errors, never panics.
#[derive(Clone)]
pub struct BackendHandle {
    requests: mpsc::Sender<BackendRequest>,
    events: broadcast::Sender<TimerEvent>,
}

impl BackendHandle {
    pub fn new(
        requests: mpsc::Sender<BackendRequest>,
        events: broadcast::Sender<TimerEvent>,
    ) -> Self {
        Self { requests, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn start_timer(&self, target_ms: u64, mode: TimerMode) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::StartTimer {
            target_ms,
            mode,
            reply,
        })
        .await?;
        rx.await.map_err(|_| backend_gone())?
    }

    pub async fn end_timer(&self) -> Result<SessionInfo, String> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::EndTimer { reply }).await?;
        rx.await.map_err(|_| backend_gone())?
    }

    pub async fn cancel_timer(&self) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::CancelTimer { reply }).await?;
        rx.await.map_err(|_| backend_gone())?
    }

    pub async fn get_timer_state(&self) -> Result<TimerSnapshot, String> {
        let (reply, rx) = oneshot::channel();
        self.send(BackendRequest::GetTimerState { reply }).await?;
        rx.await.map_err(|_| backend_gone())?
    }

    async fn send(&self, request: BackendRequest) -> Result<(), String> {
        self.requests
            .send(request)
            .await
            .map_err(|_| backend_gone())
    }
}

fn backend_gone() -> String {
    "timer backend is not reachable".to_string()
}

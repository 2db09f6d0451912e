use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Running,
    Stopped,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Countdown,
    Stopwatch,
    Break,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Countdown
    }
}

impl TimerMode {
    /// Stopwatch is the only mode whose display grows from `active_ms`;
    /// countdown and break both shrink from `remaining_ms`.
    pub fn counts_up(&self) -> bool {
        matches!(self, TimerMode::Stopwatch)
    }
}

/// Read-only copy of the backend's timer state. The backend is the sole
/// writer; this crate never mutates one of these after receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub mode: TimerMode,
    pub session_id: Option<String>,
    pub target_ms: u64,
    pub active_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            mode: TimerMode::Countdown,
            session_id: None,
            target_ms: 0,
            active_ms: 0,
            started_at: None,
        }
    }
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// One authoritative view of timer state at an instant, as produced by the
/// backend for both push events and the `get_timer_state` pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_ms: i64,
}

impl TimerSnapshot {
    /// Field-by-field equality guard used to suppress redundant deliveries.
    /// Heartbeats re-send the same payload shape as state changes, so the
    /// comparison is on values, never on which channel carried them.
    pub fn value_eq(&self, other: &TimerSnapshot) -> bool {
        self.remaining_ms == other.remaining_ms
            && self.state.status == other.state.status
            && self.state.session_id == other.state.session_id
            && self.state.target_ms == other.state.target_ms
            && self.state.active_ms == other.state.active_ms
            && self.state.started_at == other.state.started_at
    }
}

//! Thin command façade over the backend handle.
//!
//! Each operation is a single request/await with no retry. Failures are
//! converted to human-readable strings and kept as the controller's only
//! state; timer state itself is never touched here — it changes only when
//! the backend emits a new snapshot.

use log::error;

use crate::backend::BackendHandle;
use crate::timer::{SessionInfo, TimerMode};

pub struct TimerController {
    backend: BackendHandle,
    last_error: Option<String>,
}

impl TimerController {
    pub fn new(backend: BackendHandle) -> Self {
        Self {
            backend,
            last_error: None,
        }
    }

    /// The most recent command failure, for inline display. Cleared by the
    /// next successful command or explicitly.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Requests a new session. Meaningful only while idle; the backend
    /// rejects anything else and the rejection lands in `last_error`.
    pub async fn start(&mut self, target_ms: u64, mode: TimerMode) -> bool {
        match self.backend.start_timer(target_ms, mode).await {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(message) => {
                error!("start_timer failed: {message}");
                self.last_error = Some(message);
                false
            }
        }
    }

    /// Requests session termination. On success the summary is returned for
    /// the caller to hand to the completion watcher; on failure the timer is
    /// unchanged and the user may retry.
    pub async fn end(&mut self) -> Option<SessionInfo> {
        match self.backend.end_timer().await {
            Ok(info) => {
                self.last_error = None;
                Some(info)
            }
            Err(message) => {
                error!("end_timer failed: {message}");
                self.last_error = Some(message);
                None
            }
        }
    }

    /// Abandons the current session without a displayable result.
    pub async fn cancel(&mut self) -> bool {
        match self.backend.cancel_timer().await {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(message) => {
                error!("cancel_timer failed: {message}");
                self.last_error = Some(message);
                false
            }
        }
    }
}

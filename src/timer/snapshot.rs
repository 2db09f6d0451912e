//! Authoritative snapshot store and the pump task that feeds it.
//!
//! The store is sourced once via `get_timer_state` and thereafter from the
//! two push channels (state changes and heartbeats). Every arrival, whatever
//! its path, goes through the single `apply` entry point, so duplicate and
//! out-of-order delivery reduce to the value-equality guard.

use log::warn;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::backend::BackendHandle;
use crate::timer::{TimerSnapshot, TimerStatus};
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Suppressed,
}

/// Pure reducer over the single in-memory snapshot.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<TimerSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&TimerSnapshot> {
        self.current.as_ref()
    }

    /// Applies `next` unless it is value-identical to the held snapshot.
    /// Suppressed applications must cause no downstream recomputation.
    pub fn apply(&mut self, next: TimerSnapshot) -> ApplyOutcome {
        if let Some(current) = &self.current {
            if current.value_eq(&next) {
                return ApplyOutcome::Suppressed;
            }

            // The backend is authoritative even when remaining time grows on
            // a running countdown (a fast local clock produces this after a
            // heartbeat correction), so accept it but leave a trace.
            if next.state.status == TimerStatus::Running
                && !next.state.mode.counts_up()
                && current.state.session_id == next.state.session_id
                && next.remaining_ms > current.remaining_ms
            {
                warn!(
                    "remaining_ms increased on running countdown ({} -> {})",
                    current.remaining_ms, next.remaining_ms
                );
            }
        }

        self.current = Some(next);
        ApplyOutcome::Applied
    }
}

/// Receiver half of the pump: the latest applied snapshot (`None` until the
/// first successful apply) plus the initial-pull error cell.
pub struct SnapshotFeed {
    pub snapshots: watch::Receiver<Option<TimerSnapshot>>,
    pub pull_error: watch::Receiver<Option<String>>,
}

/// Spawns the pump task. Subscribes to push events before issuing the pull so
/// no transition can fall between the two; the equality guard makes the
/// resulting replay harmless. Cancel the token to tear everything down.
pub fn spawn_snapshot_pump(backend: BackendHandle, cancel: CancellationToken) -> SnapshotFeed {
    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (error_tx, error_rx) = watch::channel(None);

    tokio::spawn(async move {
        let mut events = backend.subscribe();
        let mut store = SnapshotStore::new();

        // One-shot pull, raced against teardown so a late result can never
        // apply to a store nobody is watching.
        tokio::select! {
            _ = cancel.cancelled() => return,
            pulled = backend.get_timer_state() => match pulled {
                Ok(snapshot) => {
                    publish(&mut store, &snapshot_tx, snapshot);
                }
                Err(message) => {
                    log_error!("initial timer state pull failed: {message}");
                    let _ = error_tx.send(Some(message));
                }
            }
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        publish(&mut store, &snapshot_tx, event.into_snapshot());
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log_info!("snapshot pump lagged, skipped {skipped} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });

    SnapshotFeed {
        snapshots: snapshot_rx,
        pull_error: error_rx,
    }
}

fn publish(
    store: &mut SnapshotStore,
    tx: &watch::Sender<Option<TimerSnapshot>>,
    next: TimerSnapshot,
) {
    if store.apply(next) == ApplyOutcome::Applied {
        let _ = tx.send(store.current().cloned());
    }
}

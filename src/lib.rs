//! Timer synchronization and smooth-rendering core for the lefocus frontend.
//!
//! The native backend owns all durable state; this crate keeps the on-screen
//! clock visually accurate between the backend's coarse updates and lets the
//! user edit the displayed duration without fighting externally driven
//! changes. Data flows one way in (snapshot pump → smooth display) and one
//! way out (duration field → controller → backend → a new snapshot).

pub mod backend;
pub mod settings;
pub mod timer;
pub mod utils;

pub use backend::{BackendHandle, BackendRequest, TimerEvent};
pub use settings::{CoreSettings, SettingsStore};
pub use timer::{
    DurationField, Origin, SessionCompletionWatcher, SessionInfo, SessionStatus, SmoothCountdown,
    TargetUpdate, TimerController, TimerMode, TimerSnapshot, TimerState, TimerStatus,
};

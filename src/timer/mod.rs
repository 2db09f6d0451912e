pub mod completion;
pub mod controller;
pub mod display;
pub mod edit;
pub mod session;
pub mod snapshot;
pub mod state;

pub use completion::SessionCompletionWatcher;
pub use controller::TimerController;
pub use display::{spawn_display_loop, DisplayInput, SmoothCountdown};
pub use edit::{DurationField, Origin, TargetUpdate};
pub use session::{SessionInfo, SessionStatus};
pub use snapshot::{spawn_snapshot_pump, ApplyOutcome, SnapshotFeed, SnapshotStore};
pub use state::{TimerMode, TimerSnapshot, TimerState, TimerStatus};

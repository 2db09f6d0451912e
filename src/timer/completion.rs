//! One-shot surfacing of the most recently completed session.

use crate::timer::SessionInfo;

/// Holds the latest completed-session summary and which session id the user
/// has dismissed. What to show is computed, never stored, so redelivery of
/// the same completion can never resurface a dismissed session.
#[derive(Debug, Default)]
pub struct SessionCompletionWatcher {
    latest: Option<SessionInfo>,
    dismissed_session_id: Option<String>,
}

impl SessionCompletionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, session: SessionInfo) {
        self.latest = Some(session);
    }

    /// The summary to display: the latest one, unless already dismissed.
    pub fn visible(&self) -> Option<&SessionInfo> {
        let latest = self.latest.as_ref()?;
        if self.dismissed_session_id.as_deref() == Some(latest.id.as_str()) {
            None
        } else {
            Some(latest)
        }
    }

    /// Dismisses whatever is currently visible. A no-op when nothing is.
    pub fn dismiss(&mut self) {
        if let Some(visible) = self.visible() {
            self.dismissed_session_id = Some(visible.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionStatus;
    use chrono::Utc;

    fn session(id: &str) -> SessionInfo {
        SessionInfo {
            id: id.to_string(),
            started_at: Utc::now(),
            stopped_at: Some(Utc::now()),
            status: SessionStatus::Completed,
            target_ms: 1_500_000,
            active_ms: 1_500_000,
            label: None,
            note: None,
        }
    }

    #[test]
    fn completed_session_shows_until_dismissed() {
        let mut watcher = SessionCompletionWatcher::new();
        assert!(watcher.visible().is_none());

        watcher.record(session("s1"));
        assert_eq!(watcher.visible().unwrap().id, "s1");

        watcher.dismiss();
        assert!(watcher.visible().is_none());
    }

    #[test]
    fn redelivery_of_dismissed_session_stays_hidden() {
        let mut watcher = SessionCompletionWatcher::new();
        watcher.record(session("s1"));
        watcher.dismiss();

        watcher.record(session("s1"));
        assert!(watcher.visible().is_none());
    }

    #[test]
    fn a_new_session_displaces_the_dismissal() {
        let mut watcher = SessionCompletionWatcher::new();
        watcher.record(session("s1"));
        watcher.dismiss();

        watcher.record(session("s2"));
        assert_eq!(watcher.visible().unwrap().id, "s2");

        watcher.dismiss();
        assert!(watcher.visible().is_none());
    }

    #[test]
    fn dismiss_with_nothing_visible_is_a_noop() {
        let mut watcher = SessionCompletionWatcher::new();
        watcher.dismiss();

        watcher.record(session("s1"));
        assert_eq!(watcher.visible().unwrap().id, "s1");
    }
}

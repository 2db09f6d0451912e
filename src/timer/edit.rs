//! Editable duration entry, reconciled against externally driven changes.
//!
//! Two writers target the same on-screen field: the user's keypad entry and
//! the externally supplied target duration (preset clicks, restored config).
//! Naive two-way binding either clobbers keystrokes or ignores presets, so
//! every duration update entering the field carries an explicit origin tag
//! and reconciliation is a pattern match. A committed value reflected back by
//! the parent arrives tagged `Local` and can never stomp the buffer.

/// Who produced a target-duration update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Emitted by this field's own commit, reflected back by the parent.
    Local,
    /// An independent external change (preset click, loaded default).
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUpdate {
    pub ms: u64,
    pub origin: Origin,
}

impl TargetUpdate {
    pub fn local(ms: u64) -> Self {
        Self {
            ms,
            origin: Origin::Local,
        }
    }

    pub fn external(ms: u64) -> Self {
        Self {
            ms,
            origin: Origin::External,
        }
    }
}

/// Keypad-entry duration buffer with `mm:ss` semantics: typing shifts digits
/// in from the right, backspace shifts them back out. Keystrokes never emit;
/// `commit` is the single point of outward emission.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DurationField {
    /// Up to four digits interpreted as `mmss`. Seconds may read up to 99,
    /// matching raw keypad entry rather than normalized clock time.
    digits: u32,
    last_external_ms: Option<u64>,
}

impl DurationField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ms(ms: u64) -> Self {
        let mut field = Self::default();
        field.set_from_ms(ms);
        field
    }

    pub fn push_digit(&mut self, digit: u8) {
        if digit > 9 || self.digits > 999 {
            return;
        }
        self.digits = self.digits * 10 + digit as u32;
    }

    pub fn backspace(&mut self) {
        self.digits /= 10;
    }

    pub fn clear(&mut self) {
        self.digits = 0;
    }

    pub fn minutes(&self) -> u32 {
        self.digits / 100
    }

    pub fn seconds(&self) -> u32 {
        self.digits % 100
    }

    pub fn as_ms(&self) -> u64 {
        (self.minutes() as u64 * 60 + self.seconds() as u64) * 1000
    }

    pub fn text(&self) -> String {
        format!("{:02}:{:02}", self.minutes(), self.seconds())
    }

    /// Reconciles the field against the current target duration. Returns
    /// `true` when the buffer was resynced to a genuine external change.
    ///
    /// `None` means the field is non-editable and the machinery stays inert.
    /// `Local` updates are echoes of our own commit and never resync. An
    /// `External` update resyncs only when it differs from the last external
    /// value seen, so redelivery of the same preset is idempotent.
    pub fn apply_target(&mut self, update: Option<TargetUpdate>) -> bool {
        let Some(update) = update else {
            return false;
        };

        match update.origin {
            Origin::Local => false,
            Origin::External => {
                if self.last_external_ms == Some(update.ms) {
                    return false;
                }
                self.last_external_ms = Some(update.ms);
                self.set_from_ms(update.ms);
                true
            }
        }
    }

    /// Converts the buffer to milliseconds for emission upward. The caller
    /// stores the value and reflects it back as `TargetUpdate::local`.
    pub fn commit(&self) -> u64 {
        self.as_ms()
    }

    fn set_from_ms(&mut self, ms: u64) {
        let minutes = (ms / 60_000).min(99) as u32;
        let seconds = if minutes == 99 && ms / 60_000 > 99 {
            59
        } else {
            ((ms % 60_000) / 1000) as u32
        };
        self.digits = minutes * 100 + seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_entry_builds_twenty_five_minutes() {
        let mut field = DurationField::new();
        assert_eq!(field.text(), "00:00");

        for digit in [2, 5, 0, 0] {
            field.push_digit(digit);
        }

        assert_eq!(field.text(), "25:00");
        assert_eq!(field.commit(), 1_500_000);
    }

    #[test]
    fn fifth_digit_is_ignored_and_backspace_shifts_right() {
        let mut field = DurationField::new();
        for digit in [2, 5, 0, 0, 7] {
            field.push_digit(digit);
        }
        assert_eq!(field.text(), "25:00");

        field.backspace();
        assert_eq!(field.text(), "02:50");
        field.backspace();
        field.backspace();
        field.backspace();
        assert_eq!(field.text(), "00:00");
    }

    #[test]
    fn echo_of_committed_value_does_not_resync() {
        let mut field = DurationField::new();
        for digit in [2, 5, 0, 0] {
            field.push_digit(digit);
        }
        let committed = field.commit();

        // User immediately starts editing again...
        field.push_digit(9);
        let mid_edit = field.clone();

        // ...when the parent reflects the committed value back down.
        assert!(!field.apply_target(Some(TargetUpdate::local(committed))));
        assert_eq!(field, mid_edit, "echo must not stomp in-progress edits");
    }

    #[test]
    fn genuine_external_change_resyncs_the_buffer() {
        let mut field = DurationField::from_ms(1_500_000);
        assert!(field.apply_target(Some(TargetUpdate::external(600_000))));
        assert_eq!(field.text(), "10:00");
    }

    #[test]
    fn repeated_external_value_is_idempotent() {
        let mut field = DurationField::new();
        assert!(field.apply_target(Some(TargetUpdate::external(600_000))));

        // Redelivery of the same preset, with the user mid-edit in between.
        field.push_digit(3);
        let mid_edit = field.clone();
        assert!(!field.apply_target(Some(TargetUpdate::external(600_000))));
        assert_eq!(field, mid_edit);
    }

    #[test]
    fn non_editable_mode_is_inert() {
        let mut field = DurationField::from_ms(1_500_000);
        assert!(!field.apply_target(None));
        assert_eq!(field.text(), "25:00");
    }

    #[test]
    fn external_overflow_clamps_to_display_limit() {
        let mut field = DurationField::new();
        field.apply_target(Some(TargetUpdate::external(100 * 60_000)));
        assert_eq!(field.text(), "99:59");
    }

    #[test]
    fn keypad_seconds_above_sixty_still_convert() {
        let mut field = DurationField::new();
        for digit in [2, 5, 9, 9] {
            field.push_digit(digit);
        }
        assert_eq!(field.text(), "25:99");
        assert_eq!(field.commit(), (25 * 60 + 99) * 1000);
    }
}

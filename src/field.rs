//! State of a single time input.
//!
//! Everything the presentation layer needs to remember between events lives
//! here as plain data: the committed value, its display string, focus, and
//! the pending selection of an open picker. Event handlers return what the
//! caller should do next instead of touching any UI.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::allowed::{AllowedMap, SharedAllowedMap};
use crate::clock::{convert_hours_for_mode, format_display, truncate_to_minute, ClockMode};
use crate::config::TimepickerConfig;
use crate::range::{is_allowed, is_date_in_range, Bounds};
use crate::reconcile::{default_value, reconcile, RangeViolation};
use crate::timestring;

/// Result of committing typed text or a picker selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOutcome {
    /// The committed value. `None` means the field was cleared.
    pub value: Option<NaiveDateTime>,
    pub violation: Option<RangeViolation>,
    /// Whether the out-of-range notification should be shown.
    pub notify: bool,
}

impl InputOutcome {
    fn cleared() -> Self {
        InputOutcome {
            value: None,
            violation: None,
            notify: false,
        }
    }
}

pub struct TimeField {
    mode: ClockMode,
    bounds: Bounds,
    notify_out_of_range: bool,
    reference_date: NaiveDate,
    value: Option<NaiveDateTime>,
    formatted: String,
    is_pm: bool,
    focused: bool,
    pending: Option<Option<NaiveDateTime>>,
    allowed: SharedAllowedMap,
}

impl TimeField {
    /// `today` anchors time-of-day bounds and typed text while the field is
    /// empty. The time of day of `now` seeds the default value when the
    /// config has none; its date is ignored.
    pub fn new(config: &TimepickerConfig, today: NaiveDate, now: NaiveDateTime) -> Self {
        let bounds = config.bounds(today);
        let value = config
            .initial_value(today)
            .unwrap_or_else(|| default_value(today.and_time(now.time()), &bounds));

        let mut field = TimeField {
            mode: config.mode,
            bounds,
            notify_out_of_range: config.enable_invalid_input_dialog,
            reference_date: today,
            value: None,
            formatted: String::new(),
            is_pm: false,
            focused: false,
            pending: None,
            allowed: SharedAllowedMap::new(config.mode, &bounds),
        };
        field.write_value(Some(value));
        field
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn value(&self) -> Option<NaiveDateTime> {
        self.value
    }

    pub fn is_pm(&self) -> bool {
        self.is_pm
    }

    pub fn formatted_value(&self) -> &str {
        &self.formatted
    }

    pub fn allowed_map(&self) -> Arc<AllowedMap> {
        self.allowed.snapshot()
    }

    pub fn set_value(&mut self, value: Option<NaiveDateTime>) {
        self.value = value;
        match value {
            Some(value) => {
                self.is_pm = convert_hours_for_mode(value.hour(), self.mode).is_pm();
                self.formatted = format_display(&value, self.mode);
            }
            None => self.formatted.clear(),
        }
    }

    /// Truncates to the minute and stores the value if it differs from the
    /// current one. Returns whether it changed.
    pub fn write_value(&mut self, value: Option<NaiveDateTime>) -> bool {
        let value = value.map(truncate_to_minute);
        if value == self.value {
            return false;
        }
        self.set_value(value);
        true
    }

    /// The text the input should show, or `None` while the user is typing.
    pub fn display_text(&self) -> Option<&str> {
        if self.focused {
            None
        } else {
            Some(&self.formatted)
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Leaves the input and returns the text it should be reset to.
    pub fn blur(&mut self) -> &str {
        self.focused = false;
        &self.formatted
    }

    /// Commit typed text. Empty or unparseable text clears the value and
    /// never notifies.
    pub fn input_changed(&mut self, text: &str) -> InputOutcome {
        let date = self
            .value
            .map(|v| v.date())
            .unwrap_or(self.reference_date);

        match timestring::parse_on(text, self.mode, date) {
            Ok(Some(candidate)) => self.commit(candidate),
            Ok(None) => {
                self.write_value(None);
                InputOutcome::cleared()
            }
            Err(e) => {
                log::debug!("Clearing value for unparseable input {:?}: {}", text, e);
                self.write_value(None);
                InputOutcome::cleared()
            }
        }
    }

    fn commit(&mut self, candidate: NaiveDateTime) -> InputOutcome {
        let reconciled = reconcile(candidate, &self.bounds);
        if let Some(violation) = reconciled.violation {
            log::debug!(
                "Clamped {} ({:?} bounds) to {}",
                candidate,
                violation,
                reconciled.value
            );
        }
        self.write_value(Some(reconciled.value));
        InputOutcome {
            value: Some(reconciled.value),
            violation: reconciled.violation,
            notify: reconciled.should_notify(self.notify_out_of_range),
        }
    }

    pub fn set_mode(&mut self, mode: ClockMode) {
        self.mode = mode;
        self.set_value(self.value);
        self.allowed.refresh(self.mode, &self.bounds);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.allowed.refresh(self.mode, &self.bounds);
    }

    pub fn set_notify_out_of_range(&mut self, enabled: bool) {
        self.notify_out_of_range = enabled;
    }

    /// Whether the committed value is within bounds. An empty field is valid.
    pub fn validate(&self) -> bool {
        is_date_in_range(&self.bounds, self.value.as_ref())
    }

    /// Whether `value`'s time of day is selectable in the picker.
    pub fn check_validity(&self, value: Option<&NaiveDateTime>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let display = convert_hours_for_mode(value.hour(), self.mode);
        is_allowed(
            display.hour,
            value.minute(),
            &self.bounds,
            self.mode,
            display.meridiem,
        )
    }

    pub fn is_picker_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a picker session on the committed value and returns it.
    pub fn open_picker(&mut self) -> Option<NaiveDateTime> {
        self.pending = Some(self.value);
        self.value
    }

    /// A selection inside the picker. Absent selections are ignored.
    pub fn picker_changed(&mut self, value: Option<NaiveDateTime>) {
        if let (Some(pending), Some(value)) = (self.pending.as_mut(), value) {
            *pending = Some(value);
        }
    }

    /// Ends the session and commits its selection. Returns `None` when no
    /// session was open.
    pub fn confirm_picker(&mut self) -> Option<InputOutcome> {
        let pending = self.pending.take()?;
        Some(match pending {
            Some(candidate) => self.commit(candidate),
            None => InputOutcome::cleared(),
        })
    }

    pub fn cancel_picker(&mut self) {
        self.pending = None;
    }
}

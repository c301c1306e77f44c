use chrono::NaiveDateTime;
use serde::Serialize;

use crate::clock::truncate_to_minute;
use crate::range::Bounds;

/// Which side of the bounds a candidate fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeViolation {
    Below,
    Above,
}

/// The value to commit for a candidate, and whether it had to be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub value: NaiveDateTime,
    pub violation: Option<RangeViolation>,
}

impl Reconciliation {
    pub fn is_out_of_range(&self) -> bool {
        self.violation.is_some()
    }

    /// The out-of-range notification is opt-in. Clamping happens either way.
    pub fn should_notify(&self, enabled: bool) -> bool {
        enabled && self.is_out_of_range()
    }
}

/// Clamp `candidate` to the nearest violated bound. The minimum is checked
/// first.
pub fn reconcile(candidate: NaiveDateTime, bounds: &Bounds) -> Reconciliation {
    let (value, violation) = match (bounds.min, bounds.max) {
        (Some(min), _) if candidate < min => (min, Some(RangeViolation::Below)),
        (_, Some(max)) if candidate > max => (max, Some(RangeViolation::Above)),
        _ => (candidate, None),
    };

    Reconciliation {
        value: truncate_to_minute(value),
        violation,
    }
}

/// The value a field starts with when it was given none: `now` to the minute,
/// moved to the time of day of whichever bound it violates.
pub fn default_value(now: NaiveDateTime, bounds: &Bounds) -> NaiveDateTime {
    let now = truncate_to_minute(now);
    match (bounds.min, bounds.max) {
        (_, Some(max)) if now > max => now.date().and_time(max.time()),
        (Some(min), _) if now < min => now.date().and_time(min.time()),
        _ => now,
    }
}

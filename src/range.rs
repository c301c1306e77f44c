use chrono::{NaiveDateTime, NaiveTime};

use crate::clock::{to_24_hour, truncate_to_minute, ClockMode, Meridiem};

/// Optional minimum and maximum instants. Both are truncated to the minute.
///
/// `min <= max` is not checked. With inverted bounds nothing is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

/// Effective identity of a set of bounds, compared by instant rather than by
/// the values that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundsKey {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Bounds {
    pub fn new(min: Option<NaiveDateTime>, max: Option<NaiveDateTime>) -> Self {
        Bounds {
            min: min.map(truncate_to_minute),
            max: max.map(truncate_to_minute),
        }
    }

    pub fn unbounded() -> Self {
        Bounds::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn key(&self) -> BoundsKey {
        BoundsKey {
            min: self.min.map(|d| d.and_utc().timestamp_millis()),
            max: self.max.map(|d| d.and_utc().timestamp_millis()),
        }
    }

    /// The bound whose date anchors time-of-day comparisons.
    fn reference(&self) -> Option<NaiveDateTime> {
        self.min.or(self.max)
    }
}

/// An absent value is always in range. A missing bound removes that side's
/// constraint.
pub fn is_date_in_range(bounds: &Bounds, value: Option<&NaiveDateTime>) -> bool {
    let Some(value) = value else {
        return true;
    };
    let above_min = bounds.min.map_or(true, |min| *value >= min);
    let below_max = bounds.max.map_or(true, |max| *value <= max);
    above_min && below_max
}

/// Whether `hour:minute` is selectable under `bounds`.
///
/// Only the time of day is compared: the instant is built on the date of the
/// minimum bound (or the maximum when there is no minimum). In 12-hour mode a
/// given `meridiem` marks `hour` as a display hour (1-12).
pub fn is_allowed(
    hour: u32,
    minute: u32,
    bounds: &Bounds,
    mode: ClockMode,
    meridiem: Option<Meridiem>,
) -> bool {
    let Some(reference) = bounds.reference() else {
        return true;
    };

    let hour = match (mode, meridiem) {
        (ClockMode::TwelveHour, Some(meridiem)) => to_24_hour(hour, meridiem),
        _ => hour,
    };

    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => {
            let candidate = reference.date().and_time(time);
            is_date_in_range(bounds, Some(&candidate))
        }
        None => false,
    }
}

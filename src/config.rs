use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::clock::ClockMode;
use crate::errors::*;
use crate::range::Bounds;
use crate::serde::optional_time_input;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A configured instant: either a time of day to be placed on a reference
/// date, or a full local datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    TimeOfDay(NaiveTime),
    At(NaiveDateTime),
}

impl TimeInput {
    pub fn resolve(&self, date: NaiveDate) -> NaiveDateTime {
        match self {
            TimeInput::TimeOfDay(time) => date.and_time(*time),
            TimeInput::At(at) => *at,
        }
    }
}

impl FromStr for TimeInput {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M") {
            return Ok(TimeInput::TimeOfDay(time));
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(TimeInput::At)
            .ok_or_else(|| Error::InvalidBound(s.to_string()))
    }
}

/// Settings for one time field, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimepickerConfig {
    #[serde(default)]
    pub mode: ClockMode,
    #[serde(default, deserialize_with = "optional_time_input")]
    pub min_date: Option<TimeInput>,
    #[serde(default, deserialize_with = "optional_time_input")]
    pub max_date: Option<TimeInput>,
    /// Initial value. When absent the field picks a default from the bounds.
    #[serde(default, deserialize_with = "optional_time_input")]
    pub value: Option<TimeInput>,
    #[serde(default)]
    pub enable_invalid_input_dialog: bool,
}

impl TimepickerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .context(&format!("Unable to open {}", path.to_string_lossy()))?;
        let config: TimepickerConfig = serde_json::from_reader(file)
            .context(&format!("{} was not well-formatted", path.to_string_lossy()))?;
        Ok(config)
    }

    /// Bounds with any time-of-day entries placed on `date`.
    pub fn bounds(&self, date: NaiveDate) -> Bounds {
        Bounds::new(
            self.min_date.map(|d| d.resolve(date)),
            self.max_date.map(|d| d.resolve(date)),
        )
    }

    pub fn initial_value(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        self.value.map(|v| v.resolve(date))
    }
}
